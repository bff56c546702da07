//! Error types for SafeNotes
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` and renders the HTML error page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::api::pages;

/// Fixed body of the unauthorized response.
///
/// Trusted markup; never built from request data.
pub const UNAUTHORIZED_MESSAGE: &str = r#"Please <a href="/">login</a> before visiting this page."#;

/// Uniform login failure message, so the response never reveals whether
/// the account exists.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Please specify a username and a password, both must be non-empty and your password must match the one you use to register.";

/// Application-wide error type
///
/// A closed set of variants; `into_response` is the single place that
/// decides status code and rendered body for each of them.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cross-site request refused by resource isolation (403)
    #[error("Cross-site request refused")]
    CrossSiteRequest,

    /// Login rejected (400)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A handler recorded more than one session action (500)
    #[error("Conflicting session actions recorded for one request")]
    SessionConflict,

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failure (500)
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Status code, trusted HTML message and metric label for this error.
    fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested page does not exist.".to_string(),
                "not_found",
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                UNAUTHORIZED_MESSAGE.to_string(),
                "unauthorized",
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                html_escape::encode_text(msg).into_owned(),
                "validation",
            ),
            AppError::CrossSiteRequest => (
                StatusCode::FORBIDDEN,
                "Cross-site requests are not allowed.".to_string(),
                "cross_site",
            ),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                INVALID_CREDENTIALS_MESSAGE.to_string(),
                "invalid_credentials",
            ),
            // Everything below renders a generic message; the detail only goes to the log.
            AppError::SessionConflict => {
                tracing::error!("handler recorded conflicting session actions");
                internal("session_conflict")
            }
            AppError::Database(error) => {
                tracing::error!(%error, "database error");
                internal("database")
            }
            AppError::PasswordHash(error) => {
                tracing::error!(%error, "password hashing failed");
                internal("password_hash")
            }
            AppError::Config(error) => {
                tracing::error!(%error, "configuration error");
                internal("config")
            }
            AppError::Internal(error) => {
                tracing::error!(error = %error, "internal error");
                internal("internal")
            }
        }
    }
}

fn internal(error_type: &'static str) -> (StatusCode, String, &'static str) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong. Please try again later.".to_string(),
        error_type,
    )
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each variant to its status code and renders the HTML error page.
    fn into_response(self) -> Response {
        let (status, message, error_type) = self.parts();

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        (status, Html(pages::error_page(status, &message))).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
