// src/utils/auth.rs

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    error::AppError,
    models::{
        token::{TokenScope, validate_token_plaintext},
        user::User,
    },
    store::{Models, StoreError},
    utils::validator::Validator,
};

/// Axum Middleware: Authentication.
///
/// Resolves `Authorization: Bearer <token>` to its user and injects the
/// `User` into the request extensions. Every response, rejections
/// included, carries `Vary: Authorization`.
pub async fn authenticate(
    State(models): State<Models>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req.headers().get(header::AUTHORIZATION).cloned();

    let mut response = match bearer_user(&models, auth_header).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn bearer_user(models: &Models, auth_header: Option<HeaderValue>) -> Result<User, AppError> {
    let auth_header = match auth_header.as_ref() {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::InvalidAuthenticationToken)?,
        None => return Err(AppError::AuthenticationRequired),
    };

    let token = match auth_header.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => token,
        _ => return Err(AppError::InvalidAuthenticationToken),
    };

    let mut v = Validator::new();
    validate_token_plaintext(&mut v, token);
    if !v.is_valid() {
        return Err(AppError::InvalidAuthenticationToken);
    }

    models
        .users
        .get_for_token(TokenScope::Authentication, token)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::InvalidAuthenticationToken,
            other => AppError::from(other),
        })
}

/// Axum Middleware: Activated accounts only.
///
/// Must run AFTER `authenticate`.
pub async fn require_activated_user(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<User>()
        .ok_or(AppError::AuthenticationRequired)?;

    if !user.activated {
        return Err(AppError::InactiveAccount);
    }

    Ok(next.run(req).await)
}
