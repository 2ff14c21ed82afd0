// src/lib.rs

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

pub use routes::create_router;

/// Application version reported by the healthcheck.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
