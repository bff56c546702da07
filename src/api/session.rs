//! Login, logout and the landing page

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use super::pages;
use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser, SessionAction};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /
///
/// Logged-in callers go straight to their notes.
pub async fn index(MaybeUser(user): MaybeUser) -> Response {
    match user {
        Some(_) => Redirect::temporary("/notes/").into_response(),
        None => Html(pages::index_page()).into_response(),
    }
}

/// POST /login
///
/// Registers unknown users and authenticates known ones. Every failure
/// answers with the same message.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Form(form) = form.map_err(|rejection| {
        tracing::debug!(%rejection, "malformed login form");
        AppError::InvalidCredentials
    })?;

    state
        .db
        .add_or_auth_user(&form.username, &form.password)
        .await
        .map_err(uniform_login_failure)?;

    tracing::info!(username = %form.username, "login succeeded");
    Ok((SessionAction::create(form.username), Redirect::to("/notes/")))
}

/// Store and hashing faults answer like a wrong password, so the login form
/// never reveals whether an account exists or what went wrong.
fn uniform_login_failure(error: AppError) -> AppError {
    match error {
        AppError::InvalidCredentials => error,
        other => {
            tracing::error!(error = %other, "login failed on the server side");
            AppError::InvalidCredentials
        }
    }
}

/// POST /logout
pub async fn logout(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    tracing::info!(username = %user, "logout requested");
    (SessionAction::Clear, Redirect::to("/"))
}
