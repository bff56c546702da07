//! SafeNotes - a small notes service behind a safe-by-default auth pipeline
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Outer layers (tower-http)                  │
//! │  - Tracing, panic recovery, body size limit                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Interceptor chain                        │
//! │  - Security headers                                         │
//! │  - Fetch Metadata cross-site refusal                        │
//! │  - Cookie-session authentication (rejects by default)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Login/logout, notes, static assets, health, metrics      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx): users, sessions, notes                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `interceptor`: two-phase interceptor chain and route registration
//! - `auth`: session cookie authentication
//! - `api`: HTTP handlers and pages
//! - `data`: Database layer and session store
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod interceptor;
pub mod metrics;

use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool, also the session store
    pub db: Arc<data::Database>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or migrated
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path)
            .await?
            .with_session_max_age(config.auth.session_max_age)?;
        tracing::info!("Database connected");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
        })
    }
}

/// Upper bound for request bodies; forms here are small.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use tower_http::{
        catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
    };

    api::app_router(state)
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> error::AppError {
    error::AppError::NotFound
}
