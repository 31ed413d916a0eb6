//! Thin blocking HTTP client for the server API.

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

pub struct VayuClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl VayuClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn current_aqi(&self, lat: f64, lng: f64) -> Result<Value> {
        self.get_json("/api/aqi/current", &[("lat", lat), ("lng", lng)])
    }

    pub fn forecast(&self, lat: f64, lng: f64) -> Result<Value> {
        self.get_json("/api/aqi/forecast", &[("lat", lat), ("lng", lng)])
    }

    pub fn sources(&self, lat: f64, lng: f64) -> Result<Value> {
        self.get_json("/api/aqi/sources", &[("lat", lat), ("lng", lng)])
    }

    pub fn seasonal_outlook(&self) -> Result<Value> {
        self.get_json("/api/seasonal-outlook", &[])
    }

    pub fn plan_route(&self, start: (f64, f64), end: (f64, f64)) -> Result<Value> {
        let body = serde_json::json!({
            "start_lat": start.0,
            "start_lng": start.1,
            "end_lat": end.0,
            "end_lng": end.1
        });
        let response = self
            .client
            .post(format!("{}/api/routes/safe", self.base_url))
            .json(&body)
            .send()
            .context("route request failed")?;
        parse_response(response)
    }

    fn get_json(&self, path: &str, query: &[(&str, f64)]) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .with_context(|| format!("request to {path} failed"))?;
        parse_response(response)
    }
}

fn parse_response(response: reqwest::blocking::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().context("response was not JSON")?;
    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("unknown error");
        anyhow::bail!("server returned {status}: {message}");
    }
    Ok(body)
}
