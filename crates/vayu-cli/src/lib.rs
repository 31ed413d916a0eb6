//! Vayu CLI - command line tools for the air-quality engine.
//!
//! This crate provides the CLI binaries:
//! - query_aqi: current AQI, forecast, and source breakdown for a point
//! - plan_route: pollution-aware route between two points

pub mod client;

pub use client::VayuClient;
