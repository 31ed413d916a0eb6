//! REST API routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use vayu_core::{
    aqi, attribution, forecast, interpolate, policy, router, Coordinate, EngineError,
    ForecastConfig, InterpolatorConfig, RouterConfig, SourceAttribution, StationSnapshot,
};

use crate::locations;
use crate::state::{AppState, StaleStatus};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/aqi/current", get(current_aqi))
        .route("/api/aqi/forecast", get(forecast_aqi))
        .route("/api/aqi/sources", get(source_breakdown))
        .route("/api/seasonal-outlook", get(seasonal_outlook))
        .route("/api/health-advisory", get(health_advisory))
        .route("/api/routes/safe", post(safe_route))
        .route("/api/policy/impact", post(policy_impact))
        .route("/health", get(health))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Overrides for contextual signals, mainly for testing and backfill.
    pub month: Option<u32>,
    pub weekday: Option<u32>,
    pub fire_count: Option<u32>,
    pub wind_speed_mps: Option<f64>,
    pub temperature_c: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SafeRouteRequest {
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct PolicyImpactRequest {
    pub policy_type: policy::PolicyKind,
    /// 0.0 (no enforcement) to 1.0 (full enforcement).
    pub intensity: f64,
}

#[derive(Debug, Serialize)]
pub struct LocationInfo {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentAqiResponse {
    pub aqi: f64,
    pub category: aqi::AqiCategory,
    pub location: LocationInfo,
    pub pollutants: vayu_core::PollutantVector,
    pub source: vayu_core::EstimateSource,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
    pub updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub location: LocationInfo,
    pub current_aqi: f64,
    pub aqi_48h: f64,
    pub aqi_72h: f64,
    pub trend: vayu_core::Trend,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub location: LocationInfo,
    pub aqi: f64,
    #[serde(flatten)]
    pub attribution: SourceAttribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct HealthAdvisoryResponse {
    pub location: LocationInfo,
    pub aqi: f64,
    pub category: aqi::AqiCategory,
    #[serde(flatten)]
    pub advisory: aqi::HealthAdvisory,
}

#[derive(Debug, Serialize)]
pub struct SafeRouteResponse {
    /// Total path length in kilometers.
    pub distance: f64,
    pub avg_aqi: f64,
    pub quality: aqi::AqiCategory,
    /// `[lat, lng]` pairs from start to end.
    pub waypoints: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<bool>,
}

// === Helpers ===

fn engine_error_response(err: EngineError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        EngineError::InvalidCoordinate { .. } => StatusCode::BAD_REQUEST,
        EngineError::RouteNotFound => StatusCode::NOT_FOUND,
        EngineError::RouteTimeout => StatusCode::REQUEST_TIMEOUT,
        EngineError::NoStationsAvailable | EngineError::UpstreamDataStale { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}

/// Resolve the query point: explicit coordinates, else the city center
/// default. Rejects points outside the service area.
fn resolve_point(
    state: &AppState,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Coordinate, (StatusCode, Json<serde_json::Value>)> {
    let config = state.config();
    let point = Coordinate::new(
        lat.unwrap_or(config.default_lat),
        lng.unwrap_or(config.default_lng),
    );
    if !config.bounds.contains(point) {
        return Err(engine_error_response(EngineError::InvalidCoordinate {
            lat: point.lat,
            lng: point.lng,
        }));
    }
    Ok(point)
}

fn location_info(point: Coordinate) -> LocationInfo {
    LocationInfo {
        lat: point.lat,
        lng: point.lng,
        name: locations::describe(point),
    }
}

fn stale_flag(state: &AppState) -> Option<bool> {
    match state.stale_status() {
        StaleStatus::Fresh => None,
        StaleStatus::Stale { failures } => {
            tracing::warn!(failures, "Serving from a stale snapshot");
            Some(true)
        }
    }
}

fn estimate_at(
    snapshot: &StationSnapshot,
    point: Coordinate,
) -> Result<vayu_core::AqiEstimate, (StatusCode, Json<serde_json::Value>)> {
    interpolate::estimate(snapshot, point, &InterpolatorConfig::default())
        .map_err(engine_error_response)
}

/// An empty snapshot behind a failing feed is an upstream outage, not
/// missing data; report it as such instead of the generic no-stations error.
fn require_stations(
    state: &AppState,
    snapshot: &StationSnapshot,
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    if snapshot.is_empty() {
        if let StaleStatus::Stale { failures } = state.stale_status() {
            return Err(engine_error_response(EngineError::UpstreamDataStale {
                failures,
            }));
        }
    }
    Ok(())
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stale = matches!(state.stale_status(), StaleStatus::Stale { .. });
    Json(json!({
        "status": "ok",
        "stations": state.snapshot().stations.len(),
        "stale": stale,
    }))
}

async fn current_aqi(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<CurrentAqiResponse>, (StatusCode, Json<serde_json::Value>)> {
    let point = resolve_point(&state, query.lat, query.lng)?;
    let snapshot = state.snapshot();
    require_stations(&state, &snapshot)?;
    let estimate = estimate_at(&snapshot, point)?;

    Ok(Json(CurrentAqiResponse {
        aqi: estimate.aqi,
        category: aqi::AqiCategory::from_aqi(estimate.aqi),
        location: location_info(point),
        pollutants: estimate.pollutants,
        source: estimate.source,
        degraded: estimate.degraded,
        stale: stale_flag(&state),
        updated_at: snapshot.taken_at,
    }))
}

async fn forecast_aqi(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<ForecastResponse>, (StatusCode, Json<serde_json::Value>)> {
    let point = resolve_point(&state, query.lat, query.lng)?;
    require_stations(&state, &state.snapshot())?;
    let history = state.history();
    let history_refs: Vec<&StationSnapshot> =
        history.iter().map(|snapshot| snapshot.as_ref()).collect();

    let result = forecast::forecast_at(
        &history_refs,
        point,
        &InterpolatorConfig::default(),
        &ForecastConfig::default(),
    )
    .map_err(engine_error_response)?;
    // The reported current AQI comes from the same snapshot the forecast was
    // fit against, so the two cannot straddle a refresh.
    let basis = history
        .last()
        .ok_or_else(|| engine_error_response(EngineError::NoStationsAvailable))?;
    let current = estimate_at(basis, point)?;

    Ok(Json(ForecastResponse {
        location: location_info(point),
        current_aqi: current.aqi,
        aqi_48h: result.aqi_48h,
        aqi_72h: result.aqi_72h,
        trend: result.trend,
        confidence: result.confidence,
        stale: stale_flag(&state),
    }))
}

async fn source_breakdown(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourcesQuery>,
) -> Result<Json<SourcesResponse>, (StatusCode, Json<serde_json::Value>)> {
    let point = resolve_point(&state, query.lat, query.lng)?;
    let snapshot = state.snapshot();
    require_stations(&state, &snapshot)?;
    let estimate = estimate_at(&snapshot, point)?;

    let now = Utc::now();
    let signals = attribution::ContextSignals {
        month: Some(query.month.unwrap_or_else(|| now.month())),
        weekday: Some(
            query
                .weekday
                .unwrap_or_else(|| now.weekday().number_from_monday()),
        ),
        fire_count: query.fire_count,
        wind_speed_mps: query.wind_speed_mps,
        temperature_c: query.temperature_c,
    };
    let result = attribution::attribute(&estimate, &signals);

    Ok(Json(SourcesResponse {
        location: location_info(point),
        aqi: estimate.aqi,
        attribution: result,
        stale: stale_flag(&state),
    }))
}

async fn seasonal_outlook() -> Json<vayu_core::SeasonalOutlook> {
    Json(vayu_core::outlook(Utc::now().month()))
}

async fn health_advisory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointQuery>,
) -> Result<Json<HealthAdvisoryResponse>, (StatusCode, Json<serde_json::Value>)> {
    let point = resolve_point(&state, query.lat, query.lng)?;
    let snapshot = state.snapshot();
    require_stations(&state, &snapshot)?;
    let estimate = estimate_at(&snapshot, point)?;
    let category = aqi::AqiCategory::from_aqi(estimate.aqi);

    Ok(Json(HealthAdvisoryResponse {
        location: location_info(point),
        aqi: estimate.aqi,
        category,
        advisory: aqi::health_advisory(category),
    }))
}

async fn policy_impact(Json(request): Json<PolicyImpactRequest>) -> Json<policy::PolicyImpact> {
    Json(policy::impact(request.policy_type, request.intensity))
}

async fn safe_route(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SafeRouteRequest>,
) -> Result<Json<SafeRouteResponse>, (StatusCode, Json<serde_json::Value>)> {
    let start = Coordinate::new(request.start_lat, request.start_lng);
    let end = Coordinate::new(request.end_lat, request.end_lng);

    let config = state.config();
    for point in [start, end] {
        if !config.bounds.contains(point) {
            return Err(engine_error_response(EngineError::InvalidCoordinate {
                lat: point.lat,
                lng: point.lng,
            }));
        }
    }

    let snapshot = state.snapshot();
    require_stations(&state, &snapshot)?;
    let route = router::find_route(
        state.graph(),
        &snapshot,
        start,
        end,
        &RouterConfig::default(),
        &InterpolatorConfig::default(),
    )
    .map_err(engine_error_response)?;

    Ok(Json(SafeRouteResponse {
        distance: route.distance_km,
        avg_aqi: route.avg_aqi,
        quality: route.quality,
        waypoints: route
            .waypoints
            .iter()
            .map(|point| [point.lat, point.lng])
            .collect(),
        stale: stale_flag(&state),
    }))
}
