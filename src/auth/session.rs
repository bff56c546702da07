//! Session management
//!
//! Opaque random tokens stored server-side, presented by the client in a
//! single cookie. Handlers never touch the cookie; they record a
//! [`SessionAction`] on their response and the auth interceptor applies it
//! on commit.

use axum::async_trait;
use axum::http::HeaderMap;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

use crate::error::AppError;

/// Server-side session storage.
///
/// Holds at most one live token per user. Implementations synchronise
/// internally and are shared by all requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The user owning `token`, if the token is live.
    async fn lookup_user(&self, token: &str) -> Result<Option<String>, AppError>;

    /// Issue a fresh token for `user`, replacing any previous one.
    async fn issue_token(&self, user: &str) -> Result<String, AppError>;

    /// Drop the session of `user`. Succeeds when there is none.
    async fn revoke_token(&self, user: &str) -> Result<(), AppError>;
}

/// Generate a new unguessable session token (32 random bytes, base64url).
pub fn generate_session_token() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Pending change to the caller's session, applied when the response is
/// committed.
///
/// Return it alongside a response:
///
/// ```ignore
/// async fn logout() -> impl IntoResponse {
///     (SessionAction::Clear, Redirect::to("/"))
/// }
/// ```
///
/// A response may carry at most one action. Recording a second one fails
/// the response with [`AppError::SessionConflict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Revoke the current session and drop the cookie.
    Clear,
    /// Start a new session for this user.
    SetForUser(String),
}

impl SessionAction {
    pub fn create(user: impl Into<String>) -> Self {
        SessionAction::SetForUser(user.into())
    }

    fn label(&self) -> &'static str {
        match self {
            SessionAction::Clear => "clear",
            SessionAction::SetForUser(_) => "create",
        }
    }
}

impl IntoResponseParts for SessionAction {
    type Error = AppError;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(previous) = res.extensions().get::<SessionAction>() {
            tracing::error!(
                previous = previous.label(),
                attempted = self.label(),
                "second session action recorded for one response"
            );
            return Err(AppError::SessionConflict);
        }
        res.extensions_mut().insert(self);
        Ok(res)
    }
}

/// Wire format of the session cookie.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self::new(
            config.auth.cookie_name.clone(),
            config.should_use_secure_cookies(),
        )
    }

    /// Token presented by the client, if any. Empty values count as absent.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        let jar = CookieJar::from_headers(headers);
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Cookie carrying a freshly issued token.
    pub fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Cookie instructing the client to drop its session.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), String::new()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        cookie
    }
}
