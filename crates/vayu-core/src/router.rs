//! Pollution-aware shortest path over the route graph.
//!
//! Edge cost blends geometric distance with the interpolated AQI sampled
//! along the edge, so the search trades a longer path against cleaner air.
//! The search is Dijkstra with deterministic tie-breaking: equal-cost paths
//! resolve by lower total distance, then fewer hops, then lower node index,
//! so repeating a query against the same snapshot yields the identical
//! route.

use crate::error::EngineError;
use crate::graph::{RouteEdge, RouteGraph};
use crate::interpolate::{self, InterpolatorConfig};
use crate::models::{Coordinate, SafeRoute, StationSnapshot};
use crate::spatial::{haversine_distance_km, point_along};
use crate::aqi::AqiCategory;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// Weight on edge distance (km) in the cost function.
pub const DISTANCE_WEIGHT_ALPHA: f64 = 1.0;
/// Weight on edge AQI in the cost function. At 0.05, an edge averaging
/// AQI 200 costs as much as 10 extra kilometers.
pub const AQI_WEIGHT_BETA: f64 = 0.05;
/// Endpoints within this distance of a registered node snap onto it.
pub const SNAP_TOLERANCE_KM: f64 = 0.5;
/// Temporary endpoint nodes connect to this many nearest graph nodes.
pub const SNAP_NEIGHBORS: usize = 3;
/// Long edges get an extra AQI sample per this many kilometers.
pub const EDGE_SAMPLE_SPACING_KM: f64 = 2.0;
/// Node-expansion budget standing in for a wall-clock timeout; the search
/// is CPU-bound and deterministic, so a budget bounds it the same way.
pub const ROUTE_SEARCH_BUDGET: usize = 100_000;

/// Two coordinates closer than this are the same point for routing.
const SAME_POINT_EPSILON_KM: f64 = 1e-6;
const COST_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub distance_weight: f64,
    pub aqi_weight: f64,
    pub snap_tolerance_km: f64,
    pub snap_neighbors: usize,
    pub edge_sample_spacing_km: f64,
    pub search_budget: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            distance_weight: DISTANCE_WEIGHT_ALPHA,
            aqi_weight: AQI_WEIGHT_BETA,
            snap_tolerance_km: SNAP_TOLERANCE_KM,
            snap_neighbors: SNAP_NEIGHBORS,
            edge_sample_spacing_km: EDGE_SAMPLE_SPACING_KM,
            search_budget: ROUTE_SEARCH_BUDGET,
        }
    }
}

/// Total-order f64 wrapper so costs can live in the binary heap.
#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    cost: FloatOrd,
    distance_km: FloatOrd,
    hops: usize,
    node: usize,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.distance_km.cmp(&other.distance_km))
            .then_with(|| self.hops.cmp(&other.hops))
            .then_with(|| self.node.cmp(&other.node))
    }
}

#[derive(Debug, Clone, Copy)]
struct BestPath {
    cost: f64,
    distance_km: f64,
    hops: usize,
}

/// The registered graph plus up to two temporary endpoint nodes. Built per
/// request; the underlying graph is never mutated.
struct WorkingGraph {
    coords: Vec<Coordinate>,
    adjacency: Vec<Vec<RouteEdge>>,
}

impl WorkingGraph {
    fn from_graph(graph: &RouteGraph) -> Self {
        Self {
            coords: graph.nodes().iter().map(|node| node.location).collect(),
            adjacency: (0..graph.len())
                .map(|index| graph.neighbors(index).to_vec())
                .collect(),
        }
    }

    /// Resolve an endpoint: snap to a node within tolerance, otherwise
    /// insert a temporary node linked to its nearest registered neighbors.
    fn resolve_endpoint(
        &mut self,
        graph: &RouteGraph,
        location: Coordinate,
        config: &RouterConfig,
    ) -> Result<usize, EngineError> {
        let (nearest, nearest_km) = graph
            .nearest_node(location)
            .ok_or(EngineError::RouteNotFound)?;
        if nearest_km <= config.snap_tolerance_km {
            return Ok(nearest);
        }

        let index = self.coords.len();
        self.coords.push(location);
        self.adjacency.push(Vec::new());
        for (neighbor, distance_km) in graph.k_nearest(location, config.snap_neighbors.max(1)) {
            if distance_km <= 0.0 {
                continue;
            }
            self.adjacency[index].push(RouteEdge {
                to: neighbor,
                distance_km,
            });
            self.adjacency[neighbor].push(RouteEdge {
                to: index,
                distance_km,
            });
        }
        Ok(index)
    }
}

/// Average interpolated AQI along an edge: the midpoint, plus extra evenly
/// spaced samples on long edges. An estimate the interpolator cannot serve
/// contributes zero, degrading the edge toward distance-only cost.
fn edge_avg_aqi(
    snapshot: &StationSnapshot,
    from: Coordinate,
    to: Coordinate,
    config: &RouterConfig,
    interp: &InterpolatorConfig,
) -> f64 {
    let distance_km = haversine_distance_km(from, to);
    let samples = ((distance_km / config.edge_sample_spacing_km.max(0.1)).ceil() as usize).max(1);
    let mut total = 0.0;
    for i in 0..samples {
        let fraction = (i as f64 + 0.5) / samples as f64;
        let point = point_along(from, to, fraction);
        if let Ok(estimate) = interpolate::estimate(snapshot, point, interp) {
            total += estimate.aqi;
        }
    }
    total / samples as f64
}

/// Compute the pollution-aware route between `start` and `end`.
pub fn find_route(
    graph: &RouteGraph,
    snapshot: &StationSnapshot,
    start: Coordinate,
    end: Coordinate,
    config: &RouterConfig,
    interp: &InterpolatorConfig,
) -> Result<SafeRoute, EngineError> {
    for point in [start, end] {
        if !point.is_valid() {
            return Err(EngineError::InvalidCoordinate {
                lat: point.lat,
                lng: point.lng,
            });
        }
    }

    // Degenerate request: both endpoints are the same point.
    if haversine_distance_km(start, end) < SAME_POINT_EPSILON_KM {
        let aqi = interpolate::estimate(snapshot, start, interp)
            .map(|estimate| estimate.aqi)
            .unwrap_or(0.0);
        return Ok(SafeRoute {
            waypoints: vec![start, end],
            distance_km: 0.0,
            avg_aqi: aqi,
            quality: AqiCategory::from_aqi(aqi),
        });
    }

    if graph.is_empty() {
        return Err(EngineError::RouteNotFound);
    }

    let mut working = WorkingGraph::from_graph(graph);
    let source = working.resolve_endpoint(graph, start, config)?;
    let target = working.resolve_endpoint(graph, end, config)?;

    if source == target {
        // Both endpoints snapped to the same registered node.
        let node = working.coords[source];
        let aqi = interpolate::estimate(snapshot, node, interp)
            .map(|estimate| estimate.aqi)
            .unwrap_or(0.0);
        return Ok(SafeRoute {
            waypoints: vec![node, node],
            distance_km: 0.0,
            avg_aqi: aqi,
            quality: AqiCategory::from_aqi(aqi),
        });
    }

    let path = search(&working, snapshot, source, target, config, interp)?;
    Ok(assemble_route(&working, snapshot, &path, config, interp))
}

/// Dijkstra over the working graph. Returns the node path from source to
/// target.
fn search(
    working: &WorkingGraph,
    snapshot: &StationSnapshot,
    source: usize,
    target: usize,
    config: &RouterConfig,
    interp: &InterpolatorConfig,
) -> Result<Vec<usize>, EngineError> {
    let mut best: HashMap<usize, BestPath> = HashMap::new();
    let mut came_from: HashMap<usize, usize> = HashMap::new();
    let mut edge_aqi_cache: HashMap<(usize, usize), f64> = HashMap::new();
    let mut open: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();

    best.insert(
        source,
        BestPath {
            cost: 0.0,
            distance_km: 0.0,
            hops: 0,
        },
    );
    open.push(Reverse(OpenNode {
        cost: FloatOrd(0.0),
        distance_km: FloatOrd(0.0),
        hops: 0,
        node: source,
    }));

    let mut expanded = 0usize;

    while let Some(Reverse(current)) = open.pop() {
        let Some(current_best) = best.get(&current.node).copied() else {
            continue;
        };
        // Stale heap entry.
        if current.cost.0 > current_best.cost + COST_EPSILON {
            continue;
        }

        expanded += 1;
        if expanded > config.search_budget {
            return Err(EngineError::RouteTimeout);
        }

        if current.node == target {
            let mut path = vec![target];
            let mut node = target;
            while let Some(&previous) = came_from.get(&node) {
                path.push(previous);
                node = previous;
            }
            path.reverse();
            return Ok(path);
        }

        for edge in &working.adjacency[current.node] {
            let key = (current.node.min(edge.to), current.node.max(edge.to));
            let avg_aqi = *edge_aqi_cache.entry(key).or_insert_with(|| {
                edge_avg_aqi(
                    snapshot,
                    working.coords[key.0],
                    working.coords[key.1],
                    config,
                    interp,
                )
            });
            let step_cost = config.distance_weight * edge.distance_km + config.aqi_weight * avg_aqi;
            let candidate = BestPath {
                cost: current_best.cost + step_cost,
                distance_km: current_best.distance_km + edge.distance_km,
                hops: current_best.hops + 1,
            };

            let improves = match best.get(&edge.to) {
                None => true,
                Some(existing) => {
                    candidate.cost < existing.cost - COST_EPSILON
                        || ((candidate.cost - existing.cost).abs() <= COST_EPSILON
                            && (candidate.distance_km, candidate.hops)
                                < (existing.distance_km, existing.hops))
                }
            };
            if improves {
                best.insert(edge.to, candidate);
                came_from.insert(edge.to, current.node);
                open.push(Reverse(OpenNode {
                    cost: FloatOrd(candidate.cost),
                    distance_km: FloatOrd(candidate.distance_km),
                    hops: candidate.hops,
                    node: edge.to,
                }));
            }
        }
    }

    Err(EngineError::RouteNotFound)
}

/// Roll the winning path up into the response shape: total distance, a
/// distance-weighted AQI mean (longer edges contribute proportionally
/// more), and the quality band from the shared breakpoint table.
fn assemble_route(
    working: &WorkingGraph,
    snapshot: &StationSnapshot,
    path: &[usize],
    config: &RouterConfig,
    interp: &InterpolatorConfig,
) -> SafeRoute {
    let waypoints: Vec<Coordinate> = path.iter().map(|&node| working.coords[node]).collect();

    let mut distance_km = 0.0;
    let mut weighted_aqi = 0.0;
    for pair in path.windows(2) {
        let from = working.coords[pair[0]];
        let to = working.coords[pair[1]];
        let edge_km = haversine_distance_km(from, to);
        let avg_aqi = edge_avg_aqi(snapshot, from, to, config, interp);
        distance_km += edge_km;
        weighted_aqi += avg_aqi * edge_km;
    }
    let avg_aqi = if distance_km > 0.0 {
        weighted_aqi / distance_km
    } else {
        0.0
    };

    SafeRoute {
        quality: AqiCategory::from_aqi(avg_aqi),
        waypoints,
        distance_km,
        avg_aqi,
    }
}
