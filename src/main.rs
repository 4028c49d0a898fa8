use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::warn;

use grcolor::coloring::{check_coloring, color, num_colors, Method};
use grcolor::graph::{load_graph, StaticGraph};

const EXIT_BAD_FLAG: i32 = 1;
const EXIT_NO_GRAPH_DIR: i32 = 2;
const EXIT_CSV_UNOPENABLE: i32 = 3;

/// Benchmark sequential and parallel graph coloring heuristics.
#[derive(Parser)]
#[command(name = "grcolor", version, about)]
struct Cli {
    /// Graph files to color (.graph or .gra). With no files, graphs/ is scanned.
    files: Vec<PathBuf>,

    /// Number of threads for the parallel methods (clamped to logical CPUs)
    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Repeat every coloring this many times
    #[arg(short = 'n', long = "iterations", default_value_t = 1)]
    iterations: usize,

    /// Export results to results/results_<timestamp>.csv
    #[arg(long)]
    csv: bool,

    /// Benchmark the parallel methods only
    #[arg(long)]
    par: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let code = match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => EXIT_BAD_FLAG,
        };
        let _ = err.print();
        process::exit(code);
    });

    if cli.iterations == 0 {
        eprintln!("Error: the number of iterations must be at least 1");
        process::exit(EXIT_BAD_FLAG);
    }

    let available = num_cpus::get();
    let mut n_threads = cli.threads.unwrap_or(available);
    if n_threads == 0 {
        eprintln!("Error: the number of threads must be at least 1");
        process::exit(EXIT_BAD_FLAG);
    }
    if n_threads > available {
        warn!(
            requested = n_threads,
            available, "lowering thread count to the available logical processors"
        );
        n_threads = available;
    }

    let files = if cli.files.is_empty() {
        scan_graphs_dir().unwrap_or_else(|err| {
            eprintln!("Error opening graphs/ folder: {:#}", err);
            process::exit(EXIT_NO_GRAPH_DIR);
        })
    } else {
        cli.files
    };

    let mut csv_file = if cli.csv {
        let (path, file) = create_csv_file().unwrap_or_else(|err| {
            eprintln!("Error creating results file: {:#}", err);
            process::exit(EXIT_CSV_UNOPENABLE);
        });
        println!("Exporting results to {}\n", path.display());
        Some(file)
    } else {
        None
    };

    if files.is_empty() {
        println!("No graphs found in the graphs/ subfolder!");
    }

    let mut rng = rand::thread_rng();

    for path in &files {
        let start = Instant::now();
        let graph = match load_graph(path) {
            Ok(graph) => graph,
            Err(err) => {
                warn!(file = %path.display(), %err, "skipping graph");
                continue;
            }
        };
        let load_time = start.elapsed().as_secs_f64();

        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        println!(
            "{:>20} | {:>10} | {:>10} | {}",
            "GRAPH NAME", "LOADED IN", "MAX DEGREE", "ESTIMATED MEMORY FOOTPRINT"
        );
        println!(
            "{:>20} | {:>9.6}s | {:>10} | {:.2} MiB",
            name,
            load_time,
            graph.max_degree(),
            graph.approx_bytes() as f64 / 1024.0 / 1024.0
        );

        for iteration in 0..cli.iterations {
            if cli.iterations > 1 {
                println!("Iteration {} of {}", iteration + 1, cli.iterations);
            }

            println!(
                "{:>12} | {:>11} | {:>11} | VALID?",
                "COLOR METHOD", "COLORED IN", "COLORS USED"
            );

            for &method in Method::ALL.iter() {
                if cli.par && !method.is_parallel() {
                    continue;
                }

                let start = Instant::now();
                let coloring = color(&graph, method, n_threads, &mut rng);
                let coloring_time = start.elapsed().as_secs_f64();

                let colors_used = num_colors(&coloring);
                let valid = check_coloring(&graph, &coloring);

                println!(
                    "{:>12} | {:>10.6}s | {:>11} | {}",
                    method,
                    coloring_time,
                    colors_used,
                    if valid { "YES" } else { "NO" }
                );

                if valid {
                    if let Some(file) = csv_file.as_mut() {
                        if let Err(err) = writeln!(
                            file,
                            "{},{},{},{},{:.6},{}",
                            name,
                            graph.num_vertices(),
                            method,
                            n_threads,
                            coloring_time,
                            colors_used
                        ) {
                            warn!(%err, "failed to append a result row");
                        }
                    }
                }
            }
        }

        println!();
    }
}

/// Collect every .graph/.gra file under the graphs/ subfolder.
fn scan_graphs_dir() -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir("graphs").context("reading graphs/")? {
        let path = entry.context("reading graphs/ entry")?.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("graph") | Some("gra") => files.push(path),
            _ => {}
        }
    }

    files.sort();
    Ok(files)
}

fn create_csv_file() -> Result<(PathBuf, File)> {
    fs::create_dir_all("results").context("creating results/")?;

    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = PathBuf::from(format!("results/results_{}.csv", stamp));
    let mut file =
        File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(
        file,
        "graph_name,vertex_count,coloring_method,n_threads,coloring_time,colors_used"
    )
    .context("writing the csv header")?;

    Ok((path, file))
}
