// src/store/mod.rs

//! Persistence for movements, users and tokens.
//!
//! Handlers only see the traits below; `PgStore` backs them with Postgres
//! and `InMemoryStore` keeps the same semantics in process memory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;

use crate::models::{
    filters::Filters,
    movement::{Movement, MovementDetails, MovementSearch},
    token::{Token, TokenScope},
    user::User,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// The row exists under a different version than the one being written.
    #[error("edit conflict")]
    EditConflict,

    #[error("duplicate email")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

#[async_trait]
pub trait MovementStore: Send + Sync {
    /// Page of movements matching `search`, ordered by the filter's sort
    /// column with `id` ascending as tiebreak. Never fails on zero matches.
    async fn search(
        &self,
        search: &MovementSearch,
        filters: &Filters,
    ) -> Result<Vec<Movement>, StoreError>;

    /// Stores a new movement with a server-assigned id, timestamp and version 1.
    async fn insert(&self, details: &MovementDetails) -> Result<Movement, StoreError>;

    async fn get(&self, id: i64) -> Result<Movement, StoreError>;

    /// Writes `movement.details` if the stored version is still
    /// `movement.version`, returning the incremented version.
    async fn update(&self, movement: &Movement) -> Result<i32, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new user; `id`, `created_at` and `version` are assigned here.
    async fn insert(&self, user: &User) -> Result<User, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Same optimistic-concurrency contract as `MovementStore::update`.
    async fn update(&self, user: &User) -> Result<i32, StoreError>;

    /// The owner of an unexpired `scope` token whose plaintext is `plaintext`.
    /// Expired, wrong-scope and unknown tokens all yield `NotFound`.
    async fn get_for_token(&self, scope: TokenScope, plaintext: &str) -> Result<User, StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: &Token) -> Result<(), StoreError>;

    async fn delete_all_for_user(&self, user_id: i64, scope: TokenScope) -> Result<(), StoreError>;

    /// Generates a token, persists its hash and returns it with the plaintext.
    async fn new_token(
        &self,
        user_id: i64,
        ttl: Duration,
        scope: TokenScope,
    ) -> Result<Token, StoreError> {
        let token = Token::generate(user_id, ttl, scope)
            .map_err(|e| StoreError::Internal(format!("failed to generate token: {}", e)))?;
        self.insert(&token).await?;
        Ok(token)
    }
}

/// The stores handed to every handler through application state.
#[derive(Clone)]
pub struct Models {
    pub movements: Arc<dyn MovementStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl Models {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            movements: store.clone(),
            users: store.clone(),
            tokens: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            movements: store.clone(),
            users: store.clone(),
            tokens: store,
        }
    }
}
