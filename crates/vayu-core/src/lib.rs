pub mod aqi;
pub mod attribution;
pub mod error;
pub mod forecast;
pub mod graph;
pub mod interpolate;
pub mod models;
pub mod policy;
pub mod router;
pub mod seasonal;
pub mod spatial;

pub use aqi::{aqi_from_pollutants, health_advisory, sub_index, AqiCategory, HealthAdvisory};
pub use attribution::{attribute, ContextSignals};
pub use error::EngineError;
pub use forecast::{forecast, forecast_at, AqiSample, ForecastConfig};
pub use graph::{RouteEdge, RouteGraph, RouteNode};
pub use interpolate::{estimate, InterpolatorConfig};
pub use models::{
    AqiEstimate, Contributions, Coordinate, EstimateSource, ForecastResult, MonitoringStation,
    Pollutant, PollutantVector, SafeRoute, ServiceBounds, SourceAttribution, SourceCategory,
    StationSnapshot, Trend,
};
pub use policy::{PolicyImpact, PolicyKind};
pub use router::{find_route, RouterConfig};
pub use seasonal::{outlook, SeasonalOutlook};
pub use spatial::{haversine_distance_km, haversine_distance_m};
