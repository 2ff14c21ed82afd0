// src/handlers/tokens.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        token::{AUTHENTICATION_TTL, TokenScope},
        user::{LoginRequest, validate_email, validate_plain_password},
    },
    store::{Models, StoreError},
    utils::{json::ReadJson, validator::Validator},
};

/// Authenticates a user and issues a 30 day bearer token.
///
/// Unknown email and wrong password produce the same response.
pub async fn create_authentication_token(
    State(models): State<Models>,
    ReadJson(payload): ReadJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::new();
    validate_email(&mut v, &payload.email);
    validate_plain_password(&mut v, &payload.password);
    v.finish()?;

    let user = match models.users.get_by_email(&payload.email).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AppError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    if !user.password.matches(&payload.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = models
        .tokens
        .new_token(user.id, AUTHENTICATION_TTL, TokenScope::Authentication)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "authentication_token": token })),
    ))
}
