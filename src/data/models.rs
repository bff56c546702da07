//! Data models
//!
//! Rust structs representing database rows.
//! All timestamps are chrono UTC values.

use chrono::{DateTime, Utc};

// =============================================================================
// User
// =============================================================================

/// A registered user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Session
// =============================================================================

/// A live session row
///
/// The token itself never reaches the database; only its digest does.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub username: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Note
// =============================================================================

/// A note owned by one user, unique by title
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Note {
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
