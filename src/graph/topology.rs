//! Edge-set construction for the k-regular topologies.
//!
//! Both strategies decide *which* pairs are joined; weights are assigned
//! afterwards by the builder.

use super::Node;

/// Undirected simple edge set with degree bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct EdgeSet {
    n: usize,
    adjacent: Vec<bool>,
    degree: Vec<usize>,
}

impl EdgeSet {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            n,
            adjacent: vec![false; n * n],
            degree: vec![0; n],
        }
    }

    pub(crate) fn contains(&self, i: usize, j: usize) -> bool {
        self.adjacent[i * self.n + j]
    }

    pub(crate) fn degree(&self, i: usize) -> usize {
        self.degree[i]
    }

    /// Insert `(i, j)`; returns false for loops and duplicates.
    pub(crate) fn insert(&mut self, i: usize, j: usize) -> bool {
        if i == j || self.contains(i, j) {
            return false;
        }
        self.adjacent[i * self.n + j] = true;
        self.adjacent[j * self.n + i] = true;
        self.degree[i] += 1;
        self.degree[j] += 1;
        true
    }

    /// Insert only while both endpoints are below `k`.
    fn insert_capped(&mut self, i: usize, j: usize, k: usize) -> bool {
        self.degree[i] < k && self.degree[j] < k && self.insert(i, j)
    }
}

/// Hamiltonian ring, then chords, then greedy deficit repair.
///
/// The ring `0 -> 1 -> ... -> n-1 -> 0` is laid down first so a feasible tour
/// always exists. Degrees may end below `k` when the graph is too small.
pub(crate) fn ring_with_chords(n: usize, k: usize) -> EdgeSet {
    let mut edges = EdgeSet::new(n);
    if n < 2 {
        return edges;
    }

    for i in 0..n {
        edges.insert(i, (i + 1) % n);
    }

    for offset in 2..=(k / 2) {
        for i in 0..n {
            edges.insert_capped(i, (i + offset) % n, k);
        }
    }

    if k % 2 == 1 && n % 2 == 0 {
        let half = n / 2;
        for i in 0..half {
            edges.insert_capped(i, i + half, k);
        }
    }

    repair_deficits(&mut edges, k);
    edges
}

/// Connect each under-degree node to its lowest-degree eligible partner
/// until no pass adds an edge.
fn repair_deficits(edges: &mut EdgeSet, k: usize) {
    let n = edges.n;
    loop {
        let mut added = false;
        for i in 0..n {
            while edges.degree(i) < k {
                // min_by_key keeps the first minimum, so ties go to the lowest index
                let partner = (0..n)
                    .filter(|&j| j != i && !edges.contains(i, j) && edges.degree(j) < k)
                    .min_by_key(|&j| edges.degree(j));
                let Some(j) = partner else { break };
                edges.insert(i, j);
                added = true;
            }
        }
        if !added {
            break;
        }
    }
}

/// Minimum spanning forest (Prim) plus each node's `k` nearest neighbours.
///
/// Only pairs whose Euclidean distance lies in `[lo, hi]` are eligible, for
/// both the tree and the neighbour edges. With no pruning the result is
/// connected for any `k`.
pub(crate) fn mst_with_nearest(nodes: &[Node], k: usize, lo: f64, hi: f64) -> EdgeSet {
    let n = nodes.len();
    let mut edges = EdgeSet::new(n);
    let eligible = |i: usize, j: usize| -> Option<f64> {
        let d = nodes[i].distance_to(&nodes[j]);
        (i != j && d >= lo && d <= hi).then_some(d)
    };

    // Prim's algorithm, restarted from the next untouched node whenever pruning
    // leaves the current component with no outgoing edge.
    let mut in_tree = vec![false; n];
    let mut min_edge = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];

    for _ in 0..n {
        let mut u = None;
        let mut min_val = f64::INFINITY;
        for (v, (&inside, &edge)) in in_tree.iter().zip(min_edge.iter()).enumerate() {
            if !inside && edge < min_val {
                min_val = edge;
                u = Some(v);
            }
        }
        let u = match u {
            Some(u) => u,
            None => match in_tree.iter().position(|&inside| !inside) {
                Some(root) => root,
                None => break,
            },
        };

        in_tree[u] = true;
        if let Some(p) = parent[u] {
            edges.insert(p, u);
        }

        for v in 0..n {
            if in_tree[v] {
                continue;
            }
            if let Some(d) = eligible(u, v) {
                if d < min_edge[v] {
                    min_edge[v] = d;
                    parent[v] = Some(u);
                }
            }
        }
    }

    let mut candidates: Vec<(f64, usize)> = Vec::with_capacity(n);
    for i in 0..n {
        candidates.clear();
        candidates.extend((0..n).filter_map(|j| eligible(i, j).map(|d| (d, j))));
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for &(_, j) in candidates.iter().take(k) {
            edges.insert(i, j);
        }
    }

    edges
}
