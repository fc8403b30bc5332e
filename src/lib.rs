pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod server;

// Layered boundaries: use case and ports in app, adapters in infra
pub mod app;
pub mod infra;
