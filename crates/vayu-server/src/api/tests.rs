use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use vayu_core::StationSnapshot;

use crate::{api, config::Config, feed, state::AppState};

fn setup_app() -> (axum::Router, Arc<AppState>) {
    let mut config = Config::from_env();
    config.feed_url = String::new();
    config.history_len = 24;
    config.stale_after_failures = 3;

    let state = Arc::new(AppState::new(config));
    state.publish(StationSnapshot::new(feed::seed_stations(Utc::now()), Utc::now()));

    let app = api::routes().with_state(state.clone());
    (app, state)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_station_count_and_staleness() {
    let (app, state) = setup_app();
    for _ in 0..3 {
        state.record_refresh_failure();
    }

    let res = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stations"].as_u64().unwrap(), 16);
    assert_eq!(body["stale"], true);
}

#[tokio::test]
async fn current_aqi_at_a_station_location() {
    let (app, _state) = setup_app();

    // Anand Vihar seed station; within the coincident-match tolerance.
    let res = app
        .oneshot(get("/api/aqi/current?lat=28.6469&lng=77.3160"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert!(body["aqi"].as_f64().unwrap() > 100.0);
    assert_eq!(body["location"]["name"], "Anand Vihar");
    assert_eq!(body["degraded"], false);
    assert!(body.get("stale").is_none());
}

#[tokio::test]
async fn current_aqi_defaults_to_city_center() {
    let (app, _state) = setup_app();

    let res = app.oneshot(get("/api/aqi/current")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert!(body["aqi"].as_f64().unwrap() > 0.0);
    assert!((body["location"]["lat"].as_f64().unwrap() - 28.6139).abs() < 1e-9);
}

#[tokio::test]
async fn out_of_bounds_coordinates_are_rejected() {
    let (app, _state) = setup_app();

    let res = app
        .oneshot(get("/api/aqi/current?lat=19.0760&lng=72.8777"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("coordinate"));
}

#[tokio::test]
async fn empty_snapshot_yields_service_unavailable() {
    let config = Config::from_env();
    let state = Arc::new(AppState::new(config));
    let app = api::routes().with_state(state);

    let res = app
        .oneshot(get("/api/aqi/current?lat=28.6139&lng=77.2090"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn stale_empty_snapshot_reports_the_upstream_outage() {
    let config = Config::from_env();
    let state = Arc::new(AppState::new(config));
    for _ in 0..3 {
        state.record_refresh_failure();
    }
    let app = api::routes().with_state(state);

    let res = app
        .oneshot(get("/api/aqi/current?lat=28.6139&lng=77.2090"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json(res).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("refresh failures"));
}

#[tokio::test]
async fn stale_snapshot_is_flagged_in_responses() {
    let (app, state) = setup_app();
    for _ in 0..3 {
        state.record_refresh_failure();
    }

    let res = app
        .oneshot(get("/api/aqi/current?lat=28.6139&lng=77.2090"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["stale"], true);
}

#[tokio::test]
async fn forecast_with_a_single_snapshot_is_flat() {
    let (app, _state) = setup_app();

    let res = app
        .oneshot(get("/api/aqi/forecast?lat=28.6139&lng=77.2090"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    let current = body["current_aqi"].as_f64().unwrap();
    assert_eq!(body["aqi_48h"].as_f64().unwrap(), current);
    assert_eq!(body["aqi_72h"].as_f64().unwrap(), current);
    assert_eq!(body["trend"], "stable");
}

#[tokio::test]
async fn forecast_current_aqi_matches_the_current_endpoint() {
    let (app, _state) = setup_app();

    let forecast = read_json(
        app.clone()
            .oneshot(get("/api/aqi/forecast?lat=28.6139&lng=77.2090"))
            .await
            .unwrap(),
    )
    .await;
    let current = read_json(
        app.oneshot(get("/api/aqi/current?lat=28.6139&lng=77.2090"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(
        forecast["current_aqi"].as_f64().unwrap(),
        current["aqi"].as_f64().unwrap()
    );
}

#[tokio::test]
async fn sources_sum_to_100_percent() {
    let (app, _state) = setup_app();

    let res = app
        .oneshot(get(
            "/api/aqi/sources?lat=28.6139&lng=77.2090&month=11&fire_count=40",
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    let contributions = &body["contributions"];
    let total: f64 = ["traffic", "industry", "stubble_burning", "construction"]
        .iter()
        .map(|key| contributions[*key].as_f64().unwrap())
        .sum();
    assert!((total - 100.0).abs() < 0.5, "total {total}");
    assert!(body["confidence"].as_f64().unwrap() > 50.0);
}

#[tokio::test]
async fn seasonal_outlook_lists_all_months() {
    let (app, _state) = setup_app();

    let res = app.oneshot(get("/api/seasonal-outlook")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["monthly_patterns"].as_array().unwrap().len(), 12);
    assert!(body["high_risk_months"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m == "November"));
}

#[tokio::test]
async fn health_advisory_matches_category() {
    let (app, _state) = setup_app();

    let res = app
        .oneshot(get("/api/health-advisory?lat=28.6469&lng=77.3160"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert!(body["aqi"].as_f64().unwrap() > 0.0);
    assert!(!body["health_impact"].as_str().unwrap().is_empty());
    assert!(!body["recommendations"].as_array().unwrap().is_empty());
    assert!(!body["outdoor_activity"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn policy_impact_scales_with_intensity() {
    let (app, _state) = setup_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/policy/impact")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "policy_type": "stubble_control", "intensity": 1.0 }).to_string(),
        ))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["estimated_reduction"].as_f64().unwrap(), 30.0);
    assert_eq!(body["timeline_days"].as_u64().unwrap(), 14);
    assert_eq!(body["affected_sources"][0], "stubble_burning");

    let req = Request::builder()
        .method("POST")
        .uri("/api/policy/impact")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "policy_type": "odd_even", "intensity": 0.5 }).to_string(),
        ))
        .unwrap();
    let body = read_json(app.oneshot(req).await.unwrap()).await;
    assert_eq!(body["estimated_reduction"].as_f64().unwrap(), 7.5);
}

#[tokio::test]
async fn unknown_policy_type_is_rejected() {
    let (app, _state) = setup_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/policy/impact")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "policy_type": "water_sprinkling", "intensity": 1.0 }).to_string(),
        ))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn safe_route_between_known_locations() {
    let (app, _state) = setup_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/routes/safe")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "start_lat": 28.6315,
                "start_lng": 77.2167,
                "end_lat": 28.6469,
                "end_lng": 77.3160
            })
            .to_string(),
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert!(body["distance"].as_f64().unwrap() > 0.0);
    assert!(body["avg_aqi"].as_f64().unwrap() > 0.0);
    let waypoints = body["waypoints"].as_array().unwrap();
    assert!(waypoints.len() >= 2);
    assert!((waypoints[0][0].as_f64().unwrap() - 28.6315).abs() < 1e-9);
}

#[tokio::test]
async fn safe_route_rejects_out_of_bounds_endpoints() {
    let (app, _state) = setup_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/routes/safe")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "start_lat": 28.6315,
                "start_lng": 77.2167,
                "end_lat": 12.9716,
                "end_lng": 77.5946
            })
            .to_string(),
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
