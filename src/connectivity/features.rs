//! Graph features consumed by the surrogate risk screen.

use super::graph::{Adjacency, Positions};
use nalgebra::{DMatrix, SymmetricEigen};
use std::collections::BTreeMap;

/// Feature vector of one snapshot, in surrogate input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotFeatures {
    /// Longest edge of the Euclidean minimum spanning tree.
    pub mst_max_edge: f64,
    pub avg_degree: f64,
    /// Second-smallest Laplacian eigenvalue.
    pub algebraic_connectivity: f64,
}

impl SnapshotFeatures {
    pub fn compute(positions: &Positions, adj: &Adjacency) -> Self {
        Self {
            mst_max_edge: mst_max_edge_length(positions),
            avg_degree: avg_degree(adj),
            algebraic_connectivity: algebraic_connectivity(adj),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.mst_max_edge, self.avg_degree, self.algebraic_connectivity]
    }
}

/// Mean number of neighbors; 0 for an empty graph.
pub fn avg_degree(adj: &Adjacency) -> f64 {
    if adj.is_empty() {
        return 0.0;
    }
    adj.values().map(|n| n.len()).sum::<usize>() as f64 / adj.len() as f64
}

/// Disjoint-set forest with path halving and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets of `a` and `b`; `false` if already merged.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// Longest edge of the Euclidean MST over `positions` (Kruskal).
pub fn mst_max_edge_length(positions: &Positions) -> f64 {
    let points: Vec<_> = positions.values().collect();
    let n = points.len();
    if n <= 1 {
        return 0.0;
    }

    let mut edges = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            edges.push((points[i].distance(points[j]), i, j));
        }
    }
    edges.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut uf = UnionFind::new(n);
    let mut used = 0;
    let mut longest: f64 = 0.0;
    for (d, i, j) in edges {
        if uf.union(i, j) {
            used += 1;
            longest = longest.max(d);
            if used == n - 1 {
                break;
            }
        }
    }
    longest
}

/// Second-smallest eigenvalue of the graph Laplacian `L = D - A`.
///
/// Zero for graphs with fewer than two nodes and for disconnected graphs
/// (up to round-off).
pub fn algebraic_connectivity(adj: &Adjacency) -> f64 {
    let n = adj.len();
    if n < 2 {
        return 0.0;
    }
    let index: BTreeMap<_, _> = adj.keys().enumerate().map(|(i, &id)| (id, i)).collect();

    let mut laplacian = DMatrix::<f64>::zeros(n, n);
    for (u, neighbors) in adj {
        let i = index[u];
        for v in neighbors {
            if let Some(&j) = index.get(v) {
                if i != j {
                    laplacian[(i, j)] = -1.0;
                    laplacian[(j, i)] = -1.0;
                }
            }
        }
    }
    for i in 0..n {
        let degree: f64 = (0..n).filter(|&j| j != i).map(|j| -laplacian[(i, j)]).sum();
        laplacian[(i, i)] = degree;
    }

    let mut eigenvalues: Vec<f64> = SymmetricEigen::new(laplacian)
        .eigenvalues
        .iter()
        .copied()
        .collect();
    eigenvalues.sort_by(f64::total_cmp);
    eigenvalues[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::{build_graph, ConnectivityConfig};
    use crate::model::Point;

    fn positions(points: &[(f64, f64)]) -> Positions {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (i, Point::new(x, y)))
            .collect()
    }

    #[test]
    fn test_mst_max_edge_on_line() {
        let pos = positions(&[(0.0, 0.0), (3.0, 0.0), (10.0, 0.0)]);
        assert!((mst_max_edge_length(&pos) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_mst_trivial_cases() {
        assert_eq!(mst_max_edge_length(&Positions::new()), 0.0);
        assert_eq!(mst_max_edge_length(&positions(&[(1.0, 1.0)])), 0.0);
    }

    #[test]
    fn test_avg_degree_triangle() {
        let config = ConnectivityConfig::default();
        let adj = build_graph(&positions(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]), &config);
        assert!((avg_degree(&adj) - 2.0).abs() < 1e-12);
        assert_eq!(avg_degree(&Adjacency::new()), 0.0);
    }

    #[test]
    fn test_algebraic_connectivity_complete_graph() {
        // K_n has lambda_2 = n.
        let config = ConnectivityConfig::default();
        let adj = build_graph(
            &positions(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]),
            &config,
        );
        assert!((algebraic_connectivity(&adj) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_algebraic_connectivity_path_graph() {
        // P_3 Laplacian spectrum is {0, 1, 3}.
        let config = ConnectivityConfig::default();
        let adj = build_graph(&positions(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]), &config);
        assert!((algebraic_connectivity(&adj) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_algebraic_connectivity_disconnected_is_zero() {
        let config = ConnectivityConfig::default();
        let adj = build_graph(&positions(&[(0.0, 0.0), (1000.0, 0.0)]), &config);
        assert!(algebraic_connectivity(&adj).abs() < 1e-9);
    }

    #[test]
    fn test_feature_vector_order() {
        let config = ConnectivityConfig::default();
        let pos = positions(&[(0.0, 0.0), (10.0, 0.0)]);
        let adj = build_graph(&pos, &config);
        let f = SnapshotFeatures::compute(&pos, &adj).to_vec();
        assert_eq!(f.len(), 3);
        assert!((f[0] - 10.0).abs() < 1e-12);
        assert!((f[1] - 1.0).abs() < 1e-12);
        assert!((f[2] - 2.0).abs() < 1e-9);
    }
}
