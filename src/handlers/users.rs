// src/handlers/users.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        token::{ACTIVATION_TTL, TokenRequest, TokenScope, validate_token_plaintext},
        user::{Password, RegisterUserRequest, User, validate_user},
    },
    store::{Models, StoreError},
    utils::{json::ReadJson, validator::Validator},
};

/// Registers a new, not yet activated user.
///
/// Hashes the password using Argon2 before storing it and issues an
/// activation token, returned once in the response body.
pub async fn register_user(
    State(models): State<Models>,
    ReadJson(payload): ReadJson<RegisterUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut user = User {
        id: 0,
        created_at: chrono::Utc::now(),
        username: payload.username,
        email: payload.email,
        password: Password::default(),
        activated: false,
        version: 0,
    };
    user.password.set(&payload.password)?;

    let mut v = Validator::new();
    validate_user(&mut v, &user);
    v.finish()?;

    // A duplicate email converts to {"email": "must be unique"}.
    let user = models.users.insert(&user).await?;

    let token = models
        .tokens
        .new_token(user.id, ACTIVATION_TTL, TokenScope::Activation)
        .await?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": user,
            "activation_token": token,
        })),
    ))
}

/// Redeems an activation token and activates its owner.
pub async fn activate_user(
    State(models): State<Models>,
    ReadJson(payload): ReadJson<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::new();
    validate_token_plaintext(&mut v, &payload.token);
    v.finish()?;

    let mut user = match models
        .users
        .get_for_token(TokenScope::Activation, &payload.token)
        .await
    {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            let mut v = Validator::new();
            v.add_error("token", "invalid or expired activation token");
            return Err(AppError::FailedValidation(v.errors));
        }
        Err(e) => return Err(e.into()),
    };

    user.activated = true;
    user.version = models.users.update(&user).await?;

    models
        .tokens
        .delete_all_for_user(user.id, TokenScope::Activation)
        .await?;

    tracing::info!(user_id = user.id, "user activated");

    Ok(Json(json!({ "user": user })))
}
