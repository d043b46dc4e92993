//! Caching, rate-limited HTTP gateway in front of a text completion API.
//!
//! One route (`POST /openai/generate_response`) validates a prompt request,
//! serves repeats from an in-memory cache, and otherwise forwards it upstream
//! no more often than the configured rate limit allows.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod service;
pub mod state;
pub mod telemetry;
