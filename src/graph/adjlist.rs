use itertools::Itertools;

use crate::graph::StaticGraph;

/// Graph datastructure implemented as an adjacency list.
/// The graph is undirected and unweighted - only the connectivity pattern of
/// the vertices is captured. Multiple edges and self edges are disallowed.
///
/// Vertices and edges may not be removed.
#[derive(Debug, Clone)]
pub struct AdjList {
    adj: Vec<Vec<usize>>,
    n: usize,
}

impl AdjList {
    pub fn new() -> Self {
        Self { adj: vec![], n: 0 }
    }

    /// Inserts the directed arc `from -> to` only. The METIS-like `.graph`
    /// format lists every edge once per direction, so the loader replays the
    /// file as-is instead of mirroring each entry. Self-loops are dropped and
    /// duplicate arcs are ignored.
    pub fn add_arc(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }

        self.n = self.n.max(from + 1);
        self.n = self.n.max(to + 1);

        while self.adj.len() < self.n {
            self.adj.push(vec![]);
        }

        if !self.adj[from].contains(&to) {
            self.adj[from].push(to);
        }
    }

    /// Approximate heap footprint of the adjacency structure in bytes.
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.adj.capacity() * std::mem::size_of::<Vec<usize>>()
            + self
                .adj
                .iter()
                .map(|l| l.capacity() * std::mem::size_of::<usize>())
                .sum::<usize>()
    }
}

impl Default for AdjList {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticGraph for AdjList {
    /// Constructs a new graph with capacity for `n` vertices.
    fn with_capacity(n: usize) -> Self {
        let adj = vec![vec![]; n];
        Self { adj, n }
    }

    /// Queries whether an edge exists in the graph.
    fn has_edge(&self, u: usize, v: usize) -> bool {
        if u >= self.adj.len() {
            return false;
        }

        self.adj[u].contains(&v)
    }

    /// Adds an edge to the graph.
    /// `add_edge(u,v)` has the same effect as `add_edge(v,u)`
    /// as the graph captures undirected edges.
    /// Adding an edge that already exists has no effect.
    fn add_edge(&mut self, u: usize, v: usize) {
        if u == v {
            return;
        }

        self.add_arc(u, v);
        self.add_arc(v, u);
    }

    /// Returns an iterator over all the edges in the graph.
    fn edges<'a>(&'a self) -> Box<dyn Iterator<Item = (usize, usize)> + 'a> {
        Box::new(
            self.adj
                .iter()
                .enumerate()
                .flat_map(|(u, vec)| {
                    vec.iter()
                        .map(move |&v| if u > v { (v, u) } else { (u, v) })
                })
                .unique(),
        )
    }

    /// Returns the number of vertices in the graph.
    fn num_vertices(&self) -> usize {
        self.n
    }

    /// Returns the number of neighbors of `v`.
    fn degree(&self, v: usize) -> usize {
        if v >= self.adj.len() {
            0
        } else {
            self.adj[v].len()
        }
    }

    /// Returns an iterator over all the neighboring vertices in the graph.
    fn neighbors<'a>(&'a self, v: usize) -> Box<dyn Iterator<Item = usize> + 'a> {
        if v >= self.adj.len() {
            Box::new(std::iter::empty())
        } else {
            Box::new(self.adj[v].iter().cloned())
        }
    }
}
