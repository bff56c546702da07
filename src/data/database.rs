//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with embedded migrations.

use std::path::Path;

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Sqlite, SqlitePool};

use super::models::*;
use crate::auth::{SessionStore, generate_session_token};
use crate::error::AppError;

const SESSION_TOKEN_HASH_PREFIX: &str = "sha256:";
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 604_800;

fn hash_session_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{}{}", SESSION_TOKEN_HASH_PREFIX, URL_SAFE_NO_PAD.encode(digest))
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| AppError::PasswordHash(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(phc: &str, password: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(error) => {
            tracing::error!(%error, "stored password hash is malformed");
            false
        }
    }
}

/// Database connection pool wrapper.
pub struct Database {
    pub(super) pool: Pool<Sqlite>,
    session_max_age: Duration,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file and its parent directory if they don't
    /// exist, then runs migrations.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self {
            pool,
            session_max_age: Duration::seconds(DEFAULT_SESSION_MAX_AGE_SECS),
        })
    }

    /// Sessions older than `seconds` are no longer honoured.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] if `seconds` is not representable as a
    /// duration.
    pub fn with_session_max_age(mut self, seconds: i64) -> Result<Self, AppError> {
        self.session_max_age = Duration::try_seconds(seconds).ok_or_else(|| {
            AppError::Config(format!("session max age of {seconds}s is out of range"))
        })?;
        Ok(self)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Register `username`, or check the password of an existing user.
    ///
    /// Empty credentials and password mismatches both yield
    /// [`AppError::InvalidCredentials`], so callers cannot tell whether the
    /// account exists.
    pub async fn add_or_auth_user(&self, username: &str, password: &str) -> Result<(), AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        if let Some(user) = self.get_user(username).await? {
            let phc = user.password_hash;
            let password = password.to_owned();
            let matches = tokio::task::spawn_blocking(move || verify_password(&phc, &password))
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
            if !matches {
                tracing::info!(username, "password mismatch");
                return Err(AppError::InvalidCredentials);
            }
            return Ok(());
        }

        let password = password.to_owned();
        let phc = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        // A concurrent registration of the same name wins; this one is rejected.
        let inserted = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)
             ON CONFLICT(username) DO NOTHING",
        )
        .bind(username)
        .bind(&phc)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(username, "user registered");
        Ok(())
    }

    // =========================================================================
    // Notes
    // =========================================================================

    /// Add a note, or replace the text of the caller's note with that title.
    pub async fn add_or_edit_note(
        &self,
        username: &str,
        title: &str,
        text: &str,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO notes (username, title, text, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(username, title) DO UPDATE SET
                text = excluded.text,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(username)
        .bind(title)
        .bind(text)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Notes of `username`, most recently updated first.
    pub async fn get_notes(&self, username: &str) -> Result<Vec<Note>, AppError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT title, text, created_at, updated_at FROM notes
             WHERE username = ? ORDER BY updated_at DESC, title ASC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }
}

#[async_trait]
impl SessionStore for Database {
    async fn lookup_user(&self, token: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE token_hash = ?")
            .bind(hash_session_token(token))
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        if row.created_at + self.session_max_age <= Utc::now() {
            tracing::debug!(username = %row.username, "session expired");
            sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
                .bind(&row.token_hash)
                .execute(&self.pool)
                .await?;
            return Ok(None);
        }

        Ok(Some(row.username))
    }

    async fn issue_token(&self, user: &str) -> Result<String, AppError> {
        let token = generate_session_token();
        sqlx::query(
            r#"
            INSERT INTO sessions (username, token_hash, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                token_hash = excluded.token_hash,
                created_at = excluded.created_at
            "#,
        )
        .bind(user)
        .bind(hash_session_token(&token))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(token)
    }

    async fn revoke_token(&self, user: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE username = ?")
            .bind(user)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
