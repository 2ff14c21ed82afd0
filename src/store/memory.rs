// src/store/memory.rs

//! In-memory store for tests and local development.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MovementStore, StoreError, TokenStore, UserStore};
use crate::models::{
    filters::{Filters, SortColumn, SortDirection},
    movement::{Movement, MovementDetails, MovementSearch},
    token::{Token, TokenScope, token_hash},
    user::User,
};

struct StoredToken {
    user_id: i64,
    expiry: DateTime<Utc>,
    scope: TokenScope,
}

#[derive(Default)]
struct Tables {
    movements: BTreeMap<i64, Movement>,
    last_movement_id: i64,
    users: BTreeMap<i64, User>,
    last_user_id: i64,
    /// Keyed by the SHA-256 digest of the plaintext.
    tokens: HashMap<Vec<u8>, StoredToken>,
}

/// Every table behind one lock, so token lookups can join users.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Internal(format!("Failed to acquire write lock: {}", e)))
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Every word of the query occurs as a word of the name.
fn name_matches(name: &str, query: &str) -> bool {
    let name_words = words(name);
    words(query).iter().all(|w| name_words.contains(w))
}

fn contains_all(values: &[String], required: &[String]) -> bool {
    required.iter().all(|r| values.contains(r))
}

fn matches(movement: &Movement, search: &MovementSearch) -> bool {
    let d = &movement.details;
    (search.name.is_empty() || name_matches(&d.name, &search.name))
        && (search.difficulty.is_empty()
            || d.difficulty.to_lowercase() == search.difficulty.to_lowercase())
        && contains_all(&d.skilltype, &search.skilltype)
        && contains_all(&d.muscles, &search.muscles)
        && contains_all(&d.equipments, &search.equipments)
}

/// Case-insensitive, so "alpha" sorts before "Zeta" as in a Postgres collation.
fn fold_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare(a: &Movement, b: &Movement, column: SortColumn, direction: SortDirection) -> Ordering {
    let primary = match column {
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::Name => fold_cmp(&a.details.name, &b.details.name),
        SortColumn::Difficulty => fold_cmp(&a.details.difficulty, &b.details.difficulty),
    };
    let primary = match direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then(a.id.cmp(&b.id))
}

#[async_trait]
impl MovementStore for InMemoryStore {
    async fn search(
        &self,
        search: &MovementSearch,
        filters: &Filters,
    ) -> Result<Vec<Movement>, StoreError> {
        let column = filters.sort_column();
        let direction = filters.sort_direction();

        let tables = self.read()?;
        let mut found: Vec<Movement> = tables
            .movements
            .values()
            .filter(|m| matches(m, search))
            .cloned()
            .collect();
        found.sort_by(|a, b| compare(a, b, column, direction));

        Ok(found
            .into_iter()
            .skip(filters.offset() as usize)
            .take(filters.limit().max(0) as usize)
            .collect())
    }

    async fn insert(&self, details: &MovementDetails) -> Result<Movement, StoreError> {
        let mut tables = self.write()?;
        tables.last_movement_id += 1;

        let movement = Movement {
            id: tables.last_movement_id,
            created_at: Utc::now(),
            details: details.clone(),
            version: 1,
        };
        tables.movements.insert(movement.id, movement.clone());
        Ok(movement)
    }

    async fn get(&self, id: i64) -> Result<Movement, StoreError> {
        self.read()?
            .movements
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, movement: &Movement) -> Result<i32, StoreError> {
        let mut tables = self.write()?;
        match tables.movements.get_mut(&movement.id) {
            Some(stored) if stored.version == movement.version => {
                stored.details = movement.details.clone();
                stored.version += 1;
                Ok(stored.version)
            }
            _ => Err(StoreError::EditConflict),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.write()?
            .movements
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        tables.last_user_id += 1;

        let mut stored = user.clone();
        stored.password = user.password.persisted();
        stored.id = tables.last_user_id;
        stored.created_at = Utc::now();
        stored.version = 1;
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<i32, StoreError> {
        let mut tables = self.write()?;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        match tables.users.get_mut(&user.id) {
            Some(stored) if stored.version == user.version => {
                *stored = User {
                    version: stored.version + 1,
                    created_at: stored.created_at,
                    password: user.password.persisted(),
                    ..user.clone()
                };
                Ok(stored.version)
            }
            _ => Err(StoreError::EditConflict),
        }
    }

    async fn get_for_token(&self, scope: TokenScope, plaintext: &str) -> Result<User, StoreError> {
        let hash = token_hash(plaintext);
        let now = Utc::now();
        let tables = self.read()?;

        tables
            .tokens
            .get(&hash)
            .filter(|t| t.scope == scope && t.expiry > now)
            .and_then(|t| tables.users.get(&t.user_id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TokenStore for InMemoryStore {
    async fn insert(&self, token: &Token) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&token.user_id) {
            return Err(StoreError::Internal(format!(
                "token references unknown user {}",
                token.user_id
            )));
        }
        let now = Utc::now();
        tables.tokens.retain(|_, t| t.expiry > now);
        tables.tokens.insert(
            token.hash.clone(),
            StoredToken {
                user_id: token.user_id,
                expiry: token.expiry,
                scope: token.scope,
            },
        );
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: i64, scope: TokenScope) -> Result<(), StoreError> {
        self.write()?
            .tokens
            .retain(|_, t| !(t.user_id == user_id && t.scope == scope));
        Ok(())
    }
}
