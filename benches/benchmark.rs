use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use grcolor::coloring::{color, Method};
use grcolor::graph::{Graph, StaticGraph};

fn coloring_methods(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xC0105);
    let graph = Graph::random(500, 0.1, &mut rng);

    let mut group = c.benchmark_group("coloring");
    for &method in Method::ALL.iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(method.as_str()),
            &graph,
            |b, g| {
                let mut rng = StdRng::seed_from_u64(7);
                b.iter(|| color(g, method, 4, &mut rng));
            },
        );
    }
    group.finish();
}

fn parallel_thread_sweep(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xC0106);
    let graph = Graph::random(500, 0.1, &mut rng);

    for &method in Method::ALL.iter().filter(|m| m.is_parallel()) {
        let mut group = c.benchmark_group(method.as_str());
        for &n_threads in [1, 2, 4, 8].iter() {
            group.bench_with_input(
                BenchmarkId::from_parameter(n_threads),
                &n_threads,
                |b, &n_threads| {
                    let mut rng = StdRng::seed_from_u64(7);
                    b.iter(|| color(&graph, method, n_threads, &mut rng));
                },
            );
        }
        group.finish();
    }
}

criterion_group!(benches, coloring_methods, parallel_thread_sweep);
criterion_main!(benches);
