//! Authentication interceptor
//!
//! The only component deciding whether a request may reach its handler, and
//! the only owner of the session cookie lifecycle.

use std::ops::ControlFlow;
use std::sync::Arc;

use axum::async_trait;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use super::context::AuthContext;
use super::session::{SessionAction, SessionCookie, SessionStore};
use crate::error::AppError;
use crate::interceptor::{CommitResponse, ConfigSlot, Interceptor, InterceptorConfig, RequestHead};
use crate::metrics::{AUTH_DECISIONS_TOTAL, SESSION_ACTIONS_TOTAL};

/// Route opt-out for [`AuthInterceptor`].
///
/// The caller is still identified on these routes; only the rejection of
/// anonymous callers is waived. Every use exposes a route to the internet
/// unauthenticated, so keep the list short and reviewed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipAuth;

impl InterceptorConfig for SkipAuth {
    type Target = AuthInterceptor;
}

/// Cookie-session authentication.
pub struct AuthInterceptor {
    store: Arc<dyn SessionStore>,
    cookie: SessionCookie,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn SessionStore>, cookie: SessionCookie) -> Self {
        Self { store, cookie }
    }

    /// Resolve the caller from the session cookie.
    ///
    /// Missing, unknown, expired and unverifiable tokens all yield `None`.
    async fn identify(&self, headers: &HeaderMap) -> Option<String> {
        let token = self.cookie.read(headers)?;
        match self.store.lookup_user(&token).await {
            Ok(user) => user,
            Err(error) => {
                tracing::warn!(%error, "session lookup failed; treating caller as anonymous");
                None
            }
        }
    }

    async fn clear_session(&self, request: &RequestHead, response: &mut CommitResponse<'_>) {
        let user = request
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::user);

        if let Some(user) = user {
            match self.store.revoke_token(user).await {
                Ok(()) => {
                    tracing::info!(username = %user, "session cleared");
                    SESSION_ACTIONS_TOTAL
                        .with_label_values(&["clear", "ok"])
                        .inc();
                }
                Err(error) => {
                    tracing::error!(username = %user, %error, "failed to revoke session");
                    SESSION_ACTIONS_TOTAL
                        .with_label_values(&["clear", "error"])
                        .inc();
                }
            }
        }

        // The client drops its cookie even if the store could not be reached.
        response.add_cookie(&self.cookie.removal());
    }

    async fn create_session(&self, user: &str, response: &mut CommitResponse<'_>) {
        match self.store.issue_token(user).await {
            Ok(token) => {
                response.add_cookie(&self.cookie.issue(token));
                tracing::info!(username = %user, "session created");
                SESSION_ACTIONS_TOTAL
                    .with_label_values(&["create", "ok"])
                    .inc();
            }
            Err(error) => {
                tracing::error!(username = %user, %error, "failed to issue session token");
                SESSION_ACTIONS_TOTAL
                    .with_label_values(&["create", "error"])
                    .inc();
            }
        }
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn before(&self, request: &mut Parts, config: ConfigSlot<'_>) -> ControlFlow<Response> {
        let user = self.identify(&request.headers).await;
        let identified = user.is_some();
        request.extensions.insert(AuthContext::new(user));

        if config.get::<SkipAuth>().is_some() {
            AUTH_DECISIONS_TOTAL.with_label_values(&["skipped"]).inc();
            return ControlFlow::Continue(());
        }

        if !identified {
            tracing::debug!(path = %request.uri.path(), "rejecting anonymous request");
            AUTH_DECISIONS_TOTAL.with_label_values(&["rejected"]).inc();
            return ControlFlow::Break(AppError::Unauthorized.into_response());
        }

        AUTH_DECISIONS_TOTAL.with_label_values(&["identified"]).inc();
        ControlFlow::Continue(())
    }

    async fn commit(
        &self,
        request: &RequestHead,
        response: &mut CommitResponse<'_>,
        _config: ConfigSlot<'_>,
    ) {
        let Some(action) = response.take_extension::<SessionAction>() else {
            return;
        };

        match action {
            SessionAction::Clear => self.clear_session(request, response).await,
            SessionAction::SetForUser(user) => self.create_session(&user, response).await,
        }
    }
}
