// src/error.rs

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::store::StoreError;

/// Global Application Error Enum.
/// Every handler failure ends up here and is rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (malformed body, wrong types, unknown keys)
    BadRequest(String),

    // 401 Unauthorized
    InvalidCredentials,
    InvalidAuthenticationToken,
    AuthenticationRequired,

    // 403 Forbidden
    InactiveAccount,

    // 404 Not Found
    NotFound,

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict (version mismatch on update)
    EditConflict,

    // 422 Unprocessable Entity, keyed by field
    FailedValidation(BTreeMap<String, String>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, Value) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "the server encountered a problem and could not process your request".into(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.into()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid authentication credentials".into(),
            ),
            AppError::InvalidAuthenticationToken => {
                let body = Json(json!({
                    "error": "invalid or missing authentication token",
                }));
                let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                return response;
            }
            AppError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "you must be authenticated to access this resource".into(),
            ),
            AppError::InactiveAccount => (
                StatusCode::FORBIDDEN,
                "your user account must be activated to access this resource".into(),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "the requested resource could not be found".into(),
            ),
            AppError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                format!("the {} method is not supported for this resource", method).into(),
            ),
            AppError::EditConflict => (
                StatusCode::CONFLICT,
                "unable to update the record due to an edit conflict, please try again".into(),
            ),
            AppError::FailedValidation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, json!(errors)),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Classifies store failures into the HTTP taxonomy.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::EditConflict => AppError::EditConflict,
            StoreError::DuplicateEmail => AppError::FailedValidation(BTreeMap::from([(
                "email".to_string(),
                "must be unique".to_string(),
            )])),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}
