//! Shared library surface for the air-quality server and its tests.

pub mod api;
pub mod config;
pub mod feed;
pub mod locations;
pub mod loops;
pub mod state;
