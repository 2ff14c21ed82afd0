// src/models/token.rs

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::utils::validator::Validator;

/// Length of a base32 (unpadded) encoding of 16 random bytes.
pub const TOKEN_PLAINTEXT_LEN: usize = 26;

pub const ACTIVATION_TTL: Duration = Duration::days(2);
pub const AUTHENTICATION_TTL: Duration = Duration::days(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Activation,
    Authentication,
}

impl TokenScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Authentication => "authentication",
        }
    }
}

/// An opaque bearer token. Only `hash` is ever persisted; the plaintext
/// is handed to the client once, in the response that created it.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    #[serde(rename = "token")]
    pub plaintext: String,
    #[serde(skip)]
    pub hash: Vec<u8>,
    #[serde(skip)]
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    #[serde(skip)]
    pub scope: TokenScope,
}

impl Token {
    pub fn generate(
        user_id: i64,
        ttl: Duration,
        scope: TokenScope,
    ) -> Result<Self, argon2::password_hash::rand_core::Error> {
        let mut random_bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut random_bytes)?;

        let plaintext = BASE32_NOPAD.encode(&random_bytes);
        let hash = token_hash(&plaintext);

        Ok(Self {
            plaintext,
            hash,
            user_id,
            expiry: Utc::now() + ttl,
            scope,
        })
    }
}

/// SHA-256 digest under which a token is stored and looked up.
pub fn token_hash(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// DTO for token redemption (activation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

pub fn validate_token_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(plaintext.is_empty(), "token", "must be provided");
    v.check(
        plaintext.len() < TOKEN_PLAINTEXT_LEN,
        "token",
        "must be 26 bytes long",
    );
}
