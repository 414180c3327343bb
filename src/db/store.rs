// SPDX-License-Identifier: MIT

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (account storage, profile and role updates)
//! - Refresh tokens (one active row per user email)
//!
//! The store is the only place SQL lives; services and routes work with the
//! typed models. Concurrency control is the database's job (the pool hands
//! each request its own connection).

use crate::error::AppError;
use crate::models::{NewUser, RefreshTokenRecord, Role, User};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone_number, role, created_at, updated_at";

/// SQLite database client.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database named by `url` and run migrations.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to {}: {}", url, e)))?;

        tracing::info!(url, "Connected to SQLite");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Create an in-memory database for testing.
    ///
    /// A single pooled connection keeps every query on the same in-memory
    /// instance.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory db: {}", e)))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Create the schema if it does not exist yet.
    async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                phone_number TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS refresh_tokens (
                email TEXT PRIMARY KEY,
                token_hash TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user by email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Look up a user by phone number.
    pub async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE phone_number = ?",
            USER_COLUMNS
        ))
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Insert a new user and return the stored row.
    pub async fn insert_user(&self, new_user: &NewUser) -> Result<User, AppError> {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, phone_number, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone_number)
        .bind(new_user.role)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Update name and phone number on an existing account.
    pub async fn update_profile(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, phone_number = ?, updated_at = ?
             WHERE email = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(phone_number)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Change a user's role. Outstanding access tokens carrying the old role
    /// stop validating at the gate once this commits.
    pub async fn update_role(&self, email: &str, role: Role) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE email = ?")
            .bind(role)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// All user accounts, for the admin listing.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    // ─── Refresh Token Operations ────────────────────────────────

    /// Store a refresh token digest for a user, replacing any prior token.
    pub async fn upsert_refresh_token(
        &self,
        email: &str,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (email, token_hash, expires_at, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET
                token_hash = excluded.token_hash,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at",
        )
        .bind(email)
        .bind(token_hash)
        .bind(expires_at)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// The active refresh token for a user, if any.
    pub async fn find_refresh_token(
        &self,
        email: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT email, token_hash, expires_at, created_at FROM refresh_tokens WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Drop a user's refresh token (logout).
    pub async fn delete_refresh_token(&self, email: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Database(e.to_string())
}
