// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{MovementStore, StoreError, TokenStore, UserStore};
use crate::models::{
    filters::Filters,
    movement::{Movement, MovementDetails, MovementSearch},
    token::{Token, TokenScope, token_hash},
    user::{Password, User},
};

const MOVEMENT_COLUMNS: &str = "id, created_at, name, description, image, tutorials, skilltype, \
     muscles, difficulty, equipments, prerequisites, version";

const USERS_EMAIL_KEY: &str = "users_email_key";

/// Postgres-backed implementation of every store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the 'users' table; the hash column becomes a `Password`.
#[derive(FromRow)]
struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    username: String,
    email: String,
    password_hash: String,
    activated: bool,
    version: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: row.created_at,
            username: row.username,
            email: row.email,
            password: Password::from_hash(row.password_hash),
            activated: row.activated,
            version: row.version,
        }
    }
}

/// Maps the 'users_email_key' unique violation to `DuplicateEmail`.
fn user_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(USERS_EMAIL_KEY) {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(err)
}

fn password_hash(user: &User) -> Result<&str, StoreError> {
    user.password
        .hash()
        .ok_or_else(|| StoreError::Internal("user has no password hash".to_string()))
}

#[async_trait]
impl MovementStore for PgStore {
    async fn search(
        &self,
        search: &MovementSearch,
        filters: &Filters,
    ) -> Result<Vec<Movement>, StoreError> {
        // Sort column and direction come from closed enums, never from the request.
        let query = format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM movements
            WHERE (to_tsvector('english', name) @@ plainto_tsquery('english', $1) OR $1 = '')
              AND (LOWER(difficulty) = LOWER($2) OR $2 = '')
              AND (skilltype @> $3 OR cardinality($3::text[]) = 0)
              AND (muscles @> $4 OR cardinality($4::text[]) = 0)
              AND (equipments @> $5 OR cardinality($5::text[]) = 0)
            ORDER BY {} {}, id ASC
            LIMIT $6 OFFSET $7
            "#,
            filters.sort_column().as_sql(),
            filters.sort_direction().as_sql(),
        );

        let movements = sqlx::query_as::<_, Movement>(&query)
            .bind(&search.name)
            .bind(&search.difficulty)
            .bind(&search.skilltype)
            .bind(&search.muscles)
            .bind(&search.equipments)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    async fn insert(&self, details: &MovementDetails) -> Result<Movement, StoreError> {
        let (id, created_at, version) = sqlx::query_as::<_, (i64, DateTime<Utc>, i32)>(
            r#"
            INSERT INTO movements
            (name, description, image, tutorials, skilltype, muscles, difficulty, equipments, prerequisites)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, created_at, version
            "#,
        )
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.image)
        .bind(&details.tutorials)
        .bind(&details.skilltype)
        .bind(&details.muscles)
        .bind(&details.difficulty)
        .bind(&details.equipments)
        .bind(&details.prerequisites)
        .fetch_one(&self.pool)
        .await?;

        Ok(Movement {
            id,
            created_at,
            details: details.clone(),
            version,
        })
    }

    async fn get(&self, id: i64) -> Result<Movement, StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let query = format!("SELECT {MOVEMENT_COLUMNS} FROM movements WHERE id = $1");
        sqlx::query_as::<_, Movement>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, movement: &Movement) -> Result<i32, StoreError> {
        let details = &movement.details;

        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE movements
            SET name = $1, description = $2, image = $3, tutorials = $4, skilltype = $5,
                muscles = $6, difficulty = $7, equipments = $8, prerequisites = $9,
                version = version + 1
            WHERE id = $10 AND version = $11
            RETURNING version
            "#,
        )
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.image)
        .bind(&details.tutorials)
        .bind(&details.skilltype)
        .bind(&details.muscles)
        .bind(&details.difficulty)
        .bind(&details.equipments)
        .bind(&details.prerequisites)
        .bind(movement.id)
        .bind(movement.version)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::EditConflict)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let result = sqlx::query("DELETE FROM movements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, activated)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, username, email, password_hash, activated, version
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash(user)?)
        .bind(user.activated)
        .fetch_one(&self.pool)
        .await
        .map_err(user_write_error)?;

        Ok(row.into())
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, created_at, username, email, password_hash, activated, version
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::from)
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<i32, StoreError> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET username = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING version
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash(user)?)
        .bind(user.activated)
        .bind(user.id)
        .bind(user.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(user_write_error)?
        .ok_or(StoreError::EditConflict)
    }

    async fn get_for_token(&self, scope: TokenScope, plaintext: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT users.id, users.created_at, users.username, users.email,
                   users.password_hash, users.activated, users.version
            FROM users
            INNER JOIN tokens ON users.id = tokens.user_id
            WHERE tokens.hash = $1
              AND tokens.scope = $2
              AND tokens.expiry > $3
            "#,
        )
        .bind(token_hash(plaintext))
        .bind(scope.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .map(User::from)
        .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert(&self, token: &Token) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, expiry, scope)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(token.expiry)
        .bind(token.scope.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: i64, scope: TokenScope) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND scope = $2")
            .bind(user_id)
            .bind(scope.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
