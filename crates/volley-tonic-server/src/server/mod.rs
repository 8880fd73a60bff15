//! Server-side bootstrap: configuration, telemetry and the echo service.

pub mod config;
pub mod service;
pub mod telemetry;
