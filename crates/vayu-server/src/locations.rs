//! Registered Delhi NCR locations.
//!
//! These seed both the route graph nodes and the fallback station set used
//! when no upstream feed is configured.

use vayu_core::Coordinate;

pub const REGISTERED_LOCATIONS: [(&str, f64, f64); 16] = [
    ("Connaught Place", 28.6315, 77.2167),
    ("India Gate", 28.6129, 77.2295),
    ("Anand Vihar", 28.6469, 77.3160),
    ("RK Puram", 28.5632, 77.1865),
    ("Punjabi Bagh", 28.6683, 77.1310),
    ("Dwarka", 28.5921, 77.0460),
    ("Rohini", 28.7495, 77.0565),
    ("ITO", 28.6289, 77.2410),
    ("Okhla", 28.5355, 77.2734),
    ("Noida Sector 62", 28.6245, 77.3577),
    ("Gurugram", 28.4595, 77.0266),
    ("Faridabad", 28.4089, 77.3178),
    ("Ghaziabad", 28.6692, 77.4538),
    ("Lodhi Road", 28.5918, 77.2273),
    ("Mandir Marg", 28.6364, 77.2011),
    ("Shadipur", 28.6514, 77.1581),
];

pub fn named_locations() -> Vec<(String, Coordinate)> {
    REGISTERED_LOCATIONS
        .iter()
        .map(|&(name, lat, lng)| (name.to_string(), Coordinate::new(lat, lng)))
        .collect()
}

/// Display name for an arbitrary point: the nearest registered location if
/// it is reasonably close, otherwise the coordinates themselves.
pub fn describe(point: Coordinate) -> String {
    const NAME_MATCH_KM: f64 = 3.0;
    named_locations()
        .into_iter()
        .map(|(name, location)| (name, vayu_core::haversine_distance_km(point, location)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .filter(|(_, distance_km)| *distance_km <= NAME_MATCH_KM)
        .map(|(name, _)| name)
        .unwrap_or_else(|| format!("{:.4}, {:.4}", point.lat, point.lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vayu_core::{RouteGraph, ServiceBounds};

    #[test]
    fn all_locations_are_inside_service_bounds() {
        let bounds = ServiceBounds::default();
        for (name, location) in named_locations() {
            assert!(bounds.contains(location), "{name} outside bounds");
        }
    }

    #[test]
    fn default_radius_yields_a_connected_graph() {
        let graph = RouteGraph::connect_within(named_locations(), 16.0);
        // BFS from node 0 must reach every node.
        let mut seen = vec![false; graph.len()];
        let mut stack = vec![0usize];
        seen[0] = true;
        while let Some(node) = stack.pop() {
            for edge in graph.neighbors(node) {
                if !seen[edge.to] {
                    seen[edge.to] = true;
                    stack.push(edge.to);
                }
            }
        }
        for (index, reached) in seen.iter().enumerate() {
            assert!(reached, "{} unreachable", graph.node(index).name);
        }
    }

    #[test]
    fn describe_names_nearby_points() {
        assert_eq!(describe(Coordinate::new(28.6320, 77.2170)), "Connaught Place");
        // Deep in the bounds but far from anything registered.
        assert_eq!(describe(Coordinate::new(27.8, 76.4)), "27.8000, 76.4000");
    }
}
