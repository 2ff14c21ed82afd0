// src/routes.rs

use std::any::Any;

use axum::{
    Json, Router,
    http::{Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{healthcheck, movements, tokens, users},
    state::AppState,
    utils::auth::{authenticate, require_activated_user},
};

/// Assembles the main application router.
///
/// * Public routes: healthcheck, movement reads, registration, activation, login.
/// * Movement writes require a bearer token of an activated user.
/// * JSON fallbacks for 404 and 405, then global middleware (Trace, CORS, panics).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/v1/healthcheck", get(healthcheck::healthcheck))
        .route("/v1/movements", get(movements::list_movements))
        .route("/v1/movements/{id}", get(movements::show_movement))
        .route("/v1/users", post(users::register_user))
        .route("/v1/users/activate", post(users::activate_user))
        .route("/v1/users/login", post(tokens::create_authentication_token));

    // Auth first, then the activation check
    let movement_writes = Router::new()
        .route("/v1/movements", post(movements::create_movement))
        .route(
            "/v1/movements/{id}",
            put(movements::update_movement).delete(movements::delete_movement),
        )
        .layer(middleware::from_fn(require_activated_user))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .merge(public_routes)
        .merge(movement_writes)
        .fallback(healthcheck::not_found)
        .method_not_allowed_fallback(healthcheck::method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Turns a handler panic into the generic 500 envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "the server encountered a problem and could not process your request",
        })),
    )
        .into_response()
}
