// src/handlers/healthcheck.rs

use axum::{
    Json,
    extract::State,
    http::Method,
    response::IntoResponse,
};
use serde_json::json;

use crate::{VERSION, config::Config, error::AppError};

/// Reports availability, operating environment and version.
pub async fn healthcheck(State(config): State<Config>) -> impl IntoResponse {
    Json(json!({
        "system_info": {
            "status": "available",
            "environment": config.env,
            "version": VERSION,
        }
    }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
