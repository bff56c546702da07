//! Request-scoped identity

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Who the auth interceptor identified for this request.
///
/// Inserted into the request extensions on every intercepted route, whether
/// or not the route enforces authentication. Lives exactly as long as the
/// request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user: Option<String>,
}

impl AuthContext {
    pub fn new(user: Option<String>) -> Self {
        Self { user }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// Extractor for the authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(username): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {username}")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::user)
            .map(|user| CurrentUser(user.to_owned()))
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional user extractor
///
/// Returns None for anonymous callers instead of rejecting.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::user)
            .map(ToOwned::to_owned);
        Ok(MaybeUser(user))
    }
}
