// src/utils/json.rs

use axum::{
    body::to_bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::AppError;

pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Strict JSON body extractor.
///
/// Unlike `axum::Json` it does not insist on a content type, and every
/// failure becomes a 400 with a message the client can act on.
#[derive(Debug)]
pub struct ReadJson<T>(pub T);

impl<T, S> FromRequest<S> for ReadJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = to_bytes(req.into_body(), MAX_BODY_BYTES).await.map_err(|_| {
            AppError::BadRequest(format!(
                "body must not be larger than {} bytes",
                MAX_BODY_BYTES
            ))
        })?;

        decode(&bytes).map(ReadJson)
    }
}

/// Decodes exactly one JSON value from `bytes` into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("body must not be empty".to_string()));
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = T::deserialize(&mut deserializer).map_err(describe)?;

    deserializer.end().map_err(|_| {
        AppError::BadRequest("body must contain a single JSON value".to_string())
    })?;

    Ok(value)
}

fn describe(err: serde_json::Error) -> AppError {
    let message = match err.classify() {
        Category::Eof => "body contains badly formed JSON".to_string(),
        Category::Syntax => format!(
            "body contains badly formed JSON (at character {})",
            err.column()
        ),
        Category::Data => {
            let detail = err.to_string();
            if let Some(key) = quoted_after(&detail, "unknown field ") {
                format!("body contains unknown key \"{}\"", key)
            } else if detail.starts_with("invalid type") {
                format!(
                    "body contains incorrect JSON type (at character {})",
                    err.column()
                )
            } else {
                format!("body contains invalid JSON: {}", detail)
            }
        }
        Category::Io => {
            return AppError::InternalServerError(err.to_string());
        }
    };
    AppError::BadRequest(message)
}

/// serde_json reports names wrapped in backticks, e.g. "unknown field `foo`".
fn quoted_after<'a>(detail: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = detail.strip_prefix(prefix)?.strip_prefix('`')?;
    rest.split('`').next()
}
