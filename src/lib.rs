pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod openapi;
pub mod orchestrator;
pub mod rate_limit;
pub mod routes;
pub mod telemetry;
pub mod validation;
pub mod worker;
