//! Static route graph over the registered location set.
//!
//! Nodes are named city locations, not street-level road data. The graph is
//! built once at startup and read-only afterwards; route queries never
//! mutate it.

use crate::models::Coordinate;
use crate::spatial::haversine_distance_km;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteNode {
    pub name: String,
    pub location: Coordinate,
}

/// Directed half of an undirected connection; both directions are stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RouteEdge {
    pub to: usize,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteGraph {
    nodes: Vec<RouteNode>,
    adjacency: Vec<Vec<RouteEdge>>,
}

impl RouteGraph {
    /// Connect every pair of locations within `radius_km` of each other.
    pub fn connect_within(locations: Vec<(String, Coordinate)>, radius_km: f64) -> Self {
        let mut graph = Self::with_nodes(locations);
        for i in 0..graph.nodes.len() {
            for j in (i + 1)..graph.nodes.len() {
                let distance_km =
                    haversine_distance_km(graph.nodes[i].location, graph.nodes[j].location);
                if distance_km > 0.0 && distance_km <= radius_km {
                    graph.add_edge(i, j, distance_km);
                }
            }
        }
        graph
    }

    /// Build from an explicit topology: `edges` are index pairs into
    /// `locations`. Out-of-range or degenerate (self/zero-length) pairs are
    /// ignored.
    pub fn with_topology(locations: Vec<(String, Coordinate)>, edges: &[(usize, usize)]) -> Self {
        let mut graph = Self::with_nodes(locations);
        for &(a, b) in edges {
            if a == b || a >= graph.nodes.len() || b >= graph.nodes.len() {
                continue;
            }
            let distance_km = haversine_distance_km(graph.nodes[a].location, graph.nodes[b].location);
            if distance_km > 0.0 {
                graph.add_edge(a, b, distance_km);
            }
        }
        graph
    }

    fn with_nodes(locations: Vec<(String, Coordinate)>) -> Self {
        let nodes: Vec<RouteNode> = locations
            .into_iter()
            .map(|(name, location)| RouteNode { name, location })
            .collect();
        let adjacency = vec![Vec::new(); nodes.len()];
        Self { nodes, adjacency }
    }

    fn add_edge(&mut self, a: usize, b: usize, distance_km: f64) {
        self.adjacency[a].push(RouteEdge { to: b, distance_km });
        self.adjacency[b].push(RouteEdge { to: a, distance_km });
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &RouteNode {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[RouteNode] {
        &self.nodes
    }

    pub fn neighbors(&self, index: usize) -> &[RouteEdge] {
        &self.adjacency[index]
    }

    /// Nearest node to a point, with its distance in km.
    pub fn nearest_node(&self, location: Coordinate) -> Option<(usize, f64)> {
        self.k_nearest(location, 1).into_iter().next()
    }

    /// The k nearest nodes to a point, closest first. Ties resolve to the
    /// lower node index for determinism.
    pub fn k_nearest(&self, location: Coordinate, k: usize) -> Vec<(usize, f64)> {
        let mut distances: Vec<(usize, f64)> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (idx, haversine_distance_km(location, node.location)))
            .collect();
        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(k);
        distances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<(String, Coordinate)> {
        vec![
            ("Connaught Place".to_string(), Coordinate::new(28.6315, 77.2167)),
            ("India Gate".to_string(), Coordinate::new(28.6129, 77.2295)),
            ("Anand Vihar".to_string(), Coordinate::new(28.6469, 77.3160)),
        ]
    }

    #[test]
    fn connect_within_links_nearby_pairs_both_ways() {
        // CP and India Gate are ~2.4 km apart; Anand Vihar is ~10 km out.
        let graph = RouteGraph::connect_within(locations(), 5.0);
        assert_eq!(graph.len(), 3);
        assert!(graph.neighbors(0).iter().any(|edge| edge.to == 1));
        assert!(graph.neighbors(1).iter().any(|edge| edge.to == 0));
        assert!(graph.neighbors(2).is_empty());
    }

    #[test]
    fn edge_distances_are_positive_haversine() {
        let graph = RouteGraph::connect_within(locations(), 20.0);
        for index in 0..graph.len() {
            for edge in graph.neighbors(index) {
                assert!(edge.distance_km > 0.0);
                let expected = haversine_distance_km(
                    graph.node(index).location,
                    graph.node(edge.to).location,
                );
                assert!((edge.distance_km - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn explicit_topology_skips_degenerate_edges() {
        let graph = RouteGraph::with_topology(locations(), &[(0, 1), (1, 1), (0, 9)]);
        assert_eq!(graph.neighbors(0).len(), 1);
        assert_eq!(graph.neighbors(1).len(), 1);
        assert!(graph.neighbors(2).is_empty());
    }

    #[test]
    fn k_nearest_orders_by_distance() {
        let graph = RouteGraph::connect_within(locations(), 20.0);
        let near_cp = Coordinate::new(28.632, 77.217);
        let nearest = graph.k_nearest(near_cp, 2);
        assert_eq!(nearest.len(), 2);
        assert_eq!(nearest[0].0, 0);
        assert!(nearest[0].1 < nearest[1].1);
    }
}
