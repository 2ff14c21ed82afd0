// src/models/user.rs

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    utils::validator::{Validator, is_email},
};

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub username: String,

    /// Globally unique.
    pub email: String,

    /// Never serialized.
    #[serde(skip)]
    pub password: Password,

    pub activated: bool,

    #[serde(skip)]
    pub version: i32,
}

/// A user's secret: the Argon2 PHC hash, plus the plaintext while the
/// current request is still validating it.
#[derive(Clone, Default)]
pub struct Password {
    plaintext: Option<String>,
    hash: Option<String>,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}

impl Password {
    /// Wraps a hash loaded from storage.
    pub fn from_hash(hash: String) -> Self {
        Self {
            plaintext: None,
            hash: Some(hash),
        }
    }

    pub fn set(&mut self, plaintext: &str) -> Result<(), AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?
            .to_string();

        self.plaintext = Some(plaintext.to_string());
        self.hash = Some(hash);
        Ok(())
    }

    /// A mismatch is `Ok(false)`; only a missing or malformed hash is an error.
    pub fn matches(&self, candidate: &str) -> Result<bool, AppError> {
        let hash = self
            .hash
            .as_deref()
            .ok_or_else(|| AppError::InternalServerError("password hash is missing".to_string()))?;
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AppError::InternalServerError(e.to_string()))?;

        match Argon2::default().verify_password(candidate.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::InternalServerError(e.to_string())),
        }
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn plaintext(&self) -> Option<&str> {
        self.plaintext.as_deref()
    }

    /// The form that may be stored: the hash alone.
    pub fn persisted(&self) -> Self {
        Self {
            plaintext: None,
            hash: self.hash.clone(),
        }
    }
}

/// DTO for registration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(email.is_empty(), "email", "must be provided");
    v.check(!is_email(email), "email", "must be a valid email address");
}

pub fn validate_plain_password(v: &mut Validator, password: &str) {
    v.check(password.is_empty(), "password", "must be provided");
    v.check(password.len() < 8, "password", "must be at least 8 characters long");
    v.check(password.len() > 72, "password", "must not be more than 72 characters long");
}

pub fn validate_user(v: &mut Validator, user: &User) {
    let username_len = user.username.chars().count();
    v.check(user.username.is_empty(), "username", "must be provided");
    v.check(username_len <= 3, "username", "must be more than 3 characters long");
    v.check(username_len >= 100, "username", "must be less than 100 characters long");

    validate_email(v, &user.email);

    if let Some(plaintext) = user.password.plaintext.as_deref() {
        validate_plain_password(v, plaintext);
    }

    // A user without a hash can only come from a code path that forgot to
    // call `Password::set`, never from client input.
    if user.password.hash.is_none() {
        panic!("missing password hash for user");
    }
}
