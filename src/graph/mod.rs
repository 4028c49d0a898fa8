mod adjlist;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::Rng;

use crate::Error;

pub use self::adjlist::AdjList;

pub type Graph = AdjList;

/// The trait to be implemented by any graph datastructure.
/// This requires that graphs can be instantiated with a given capacity
/// and adding edges must work properly if the vertices of the edge are within
/// the capacity of the graph.
/// Implementations may however dynamically grow the graph when an edge with large
/// vertices is added.
/// # Vertices
/// Vertices should be in consecutive order. That is if `add_edge(1,2)` is called,
/// the `vertices` iterator will yield `[0, 1, 2]`. With `0` being an isolated
/// vertex.
pub trait StaticGraph: Sized {
    /// Constructs a new graph with capacity for `n` vertices.
    fn with_capacity(n: usize) -> Self;

    /// Queries whether an edge exists in the graph.
    fn has_edge(&self, u: usize, v: usize) -> bool;

    /// Adds an edge to the graph.
    /// `add_edge(u,v)` has the same effect as `add_edge(v,u)`
    /// as the graph captures undirected edges.
    /// Adding an edge that already exists has no effect.
    fn add_edge(&mut self, u: usize, v: usize);

    /// Returns an iterator over all the edges in the graph.
    fn edges<'a>(&'a self) -> Box<dyn Iterator<Item = (usize, usize)> + 'a>;

    /// Returns the number of vertices in the graph.
    fn num_vertices(&self) -> usize;

    /// Returns an iterator over all the neighboring vertices in the graph.
    fn neighbors<'a>(&'a self, v: usize) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Returns the number of neighbors of `v`.
    fn degree(&self, v: usize) -> usize {
        self.neighbors(v).count()
    }

    /// Returns an iterator over all the vertices in the graph.
    fn vertices<'a>(&'a self) -> Box<dyn Iterator<Item = usize> + 'a> {
        let n = self.num_vertices();
        if n == 0 {
            Box::new(std::iter::empty())
        } else {
            Box::new(0..n)
        }
    }

    /// Returns the number of undirected edges in the graph.
    fn num_edges(&self) -> usize {
        self.vertices().map(|v| self.degree(v)).sum::<usize>() / 2
    }

    /// Constructs a random graph with `n` vertices where each undirected
    /// edge has probability `p` of occuring in the graph.
    fn random(n: usize, p: f64, rng: &mut impl Rng) -> Self {
        let mut g = Self::with_capacity(n);

        for u in 0..n {
            for v in u + 1..n {
                if rng.gen::<f64>() < p {
                    g.add_edge(u, v);
                }
            }
        }

        g
    }

    /// Constructs a complete graph of size `n`.
    /// Every combination of vertices is connected by an edge.
    fn complete(n: usize) -> Self {
        let mut g = Self::with_capacity(n);
        for u in 0..n {
            for v in (u + 1)..n {
                g.add_edge(u, v);
            }
        }
        g
    }

    /// Returns the maximum degree of any node in the graph.
    /// That is the maximal number of neighbors any vertex has.
    fn max_degree(&self) -> usize {
        let mut max = 0;
        for u in self.vertices() {
            max = max.max(self.degree(u));
        }

        max
    }
}

/// Load a graph from file, dispatching on the extension:
/// `.graph` for the METIS-like adjacency format, `.gra` for the
/// whitespace-tokenized block format.
pub fn load_graph(name: impl AsRef<Path>) -> Result<Graph, Error> {
    let path = name.as_ref();
    let ext = path.extension().and_then(|e| e.to_str());

    match ext {
        Some("graph") => parse_metis(BufReader::new(File::open(path)?)),
        Some("gra") => parse_gra(BufReader::new(File::open(path)?)),
        _ => Err(Error::Parse(format!(
            "unsupported graph file extension on '{}'",
            path.display()
        ))),
    }
}

/// Parse the METIS-like `.graph` format.
///
/// The first non-comment line is `V E [fmt [ncon]]` with fmt one of
/// {0, 1, 10, 11, 100}; 100 resolves to 10 when ncon is nonzero and to 0
/// otherwise. Every following non-comment line is the adjacency of the next
/// vertex, 1-based:
/// - fmt 0: neighbor indices only
/// - fmt 10: ncon vertex-weight tokens, then neighbor indices
/// - fmt 1: alternating (neighbor, edge-weight) tokens; weights discarded
/// - fmt 11: one leading vertex-weight token, then alternating pairs
///
/// Lines starting with `%` are comments. Self-loops are dropped. Edges are
/// inserted one direction per listing; the file is presumed symmetric.
pub fn parse_metis(reader: impl BufRead) -> Result<Graph, Error> {
    let mut lines = reader.lines();
    let mut lineno = 0usize;

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                lineno += 1;
                if line.starts_with('%') {
                    continue;
                }
                break line;
            }
            None => return Err(Error::Parse("missing header line".to_string())),
        }
    };

    let fields = parse_tokens(&header, lineno)?;
    if fields.len() < 2 {
        return Err(Error::Parse(format!(
            "line {}: header must contain at least a vertex and an edge count",
            lineno
        )));
    }
    let v = fields[0];
    let mut fmt = fields.get(2).copied().unwrap_or(0);
    let ncon = fields.get(3).copied().unwrap_or(0);

    if fmt == 100 {
        fmt = if ncon != 0 { 10 } else { 0 };
    }
    if !matches!(fmt, 0 | 1 | 10 | 11) {
        return Err(Error::Parse(format!("line {}: invalid fmt {}", lineno, fmt)));
    }

    let mut graph = Graph::with_capacity(v);
    let mut from = 0usize;

    for line in lines {
        let line = line?;
        lineno += 1;
        if line.starts_with('%') {
            continue;
        }
        if from >= v {
            if line.trim().is_empty() {
                continue;
            }
            return Err(Error::Parse(format!(
                "line {}: more adjacency lines than the {} declared vertices",
                lineno, v
            )));
        }

        let tokens = parse_tokens(&line, lineno)?;
        let neighbors: Vec<usize> = match fmt {
            0 => tokens,
            10 => tokens.into_iter().skip(ncon).collect(),
            1 => tokens.into_iter().step_by(2).collect(),
            11 => tokens.into_iter().skip(1).step_by(2).collect(),
            _ => unreachable!(),
        };

        for to in neighbors {
            if to == 0 || to > v {
                return Err(Error::Parse(format!(
                    "line {}: neighbor index {} outside 1..={}",
                    lineno, to, v
                )));
            }
            graph.add_arc(from, to - 1);
        }
        from += 1;
    }

    Ok(graph)
}

/// Parse the `.gra` format: whitespace tokens, where the first token that
/// reads as a positive integer is the vertex count, followed by one block
/// `i: n1 n2 ... #` per vertex with 0-based indices. Every listed edge is
/// inserted in both directions.
pub fn parse_gra(mut reader: impl BufRead) -> Result<Graph, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = text.split_whitespace();

    let v = loop {
        match tokens.next() {
            Some(tok) => {
                if let Ok(n) = tok.parse::<i64>() {
                    if n > 0 {
                        break n as usize;
                    }
                }
                // Leading junk (titles, zero counts) is skipped, as consumers
                // of this format expect.
            }
            None => return Err(Error::Parse("missing vertex count".to_string())),
        }
    };

    let mut graph = Graph::with_capacity(v);

    for i in 0..v {
        let label = tokens
            .next()
            .ok_or_else(|| Error::Parse(format!("missing adjacency block for vertex {}", i)))?;
        if !label.ends_with(':') {
            return Err(Error::Parse(format!(
                "expected adjacency block label for vertex {}, found '{}'",
                i, label
            )));
        }

        loop {
            let tok = tokens.next().ok_or_else(|| {
                Error::Parse(format!("unterminated adjacency block for vertex {}", i))
            })?;
            if tok == "#" {
                break;
            }
            let to: usize = tok.parse().map_err(|_| {
                Error::Parse(format!("invalid neighbor token '{}' for vertex {}", tok, i))
            })?;
            if to >= v {
                return Err(Error::Parse(format!(
                    "neighbor index {} outside 0..{} for vertex {}",
                    to, v, i
                )));
            }
            graph.add_edge(i, to);
        }
    }

    Ok(graph)
}

fn parse_tokens(line: &str, lineno: usize) -> Result<Vec<usize>, Error> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<usize>()
                .map_err(|_| Error::Parse(format!("line {}: invalid token '{}'", lineno, tok)))
        })
        .collect()
}
