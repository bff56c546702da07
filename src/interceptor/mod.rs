//! Interceptor chain
//!
//! Cross-cutting request processing that runs around every registered
//! handler in two phases:
//!
//! - **Before** runs in registration order, prior to the handler. An
//!   interceptor may answer the request itself, which stops the chain and
//!   skips the handler.
//! - **Commit** runs in reverse registration order once the response is
//!   decided, including responses produced by a short-circuiting
//!   interceptor. It can only append response headers.
//!
//! Routes carry [`RouteConfig`] values. Each value is addressed to exactly
//! one interceptor type and is only ever handed to that interceptor.

mod chain;
mod config;
mod fetch_metadata;
mod headers;
mod router;

pub use chain::InterceptorChain;
pub use config::{ConfigSlot, InterceptorConfig, RouteConfig};
pub use fetch_metadata::{FetchMetadata, SkipFetchMetadata};
pub use headers::{SecurityHeaders, SkipSecurityHeaders};
pub use router::InterceptedRouter;

use std::ops::ControlFlow;

use axum::async_trait;
use axum::http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use axum::http::request::Parts;
use axum::response::Response;
use axum_extra::extract::cookie::Cookie;

/// A unit of cross-cutting request processing.
///
/// Implementations are shared by every request and must not keep
/// per-request state in `self`; anything a later phase needs goes into the
/// request extensions.
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Inspect the request before the handler runs.
    ///
    /// Returning `ControlFlow::Break` answers the request with that
    /// response; no later `before` hook and no handler will run.
    async fn before(&self, request: &mut Parts, config: ConfigSlot<'_>) -> ControlFlow<Response>;

    /// Observe the decided response and append headers to it.
    async fn commit(
        &self,
        _request: &RequestHead,
        _response: &mut CommitResponse<'_>,
        _config: ConfigSlot<'_>,
    ) {
    }
}

/// Request metadata as it stood after the Before phase.
///
/// The request itself is consumed by the handler, so Commit works on this
/// snapshot instead.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub extensions: Extensions,
}

impl RequestHead {
    fn snapshot(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            extensions: parts.extensions.clone(),
        }
    }
}

/// Append-only view of a decided response.
///
/// Status and body are fixed by the time Commit runs and are not reachable
/// from here.
pub struct CommitResponse<'a> {
    headers: &'a mut HeaderMap,
    extensions: &'a mut Extensions,
}

impl<'a> CommitResponse<'a> {
    pub(crate) fn new(headers: &'a mut HeaderMap, extensions: &'a mut Extensions) -> Self {
        Self {
            headers,
            extensions,
        }
    }

    /// Append a header, keeping any existing values.
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    /// Set a header unless the handler already set it.
    pub fn insert_header_if_absent(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.entry(name).or_insert(value);
    }

    /// Append a `Set-Cookie` header.
    pub fn add_cookie(&mut self, cookie: &Cookie<'_>) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => self.append_header(axum::http::header::SET_COOKIE, value),
            Err(error) => {
                tracing::error!(%error, cookie = cookie.name(), "refusing to emit malformed cookie");
            }
        }
    }

    /// Remove and return a value the handler attached to the response.
    pub fn take_extension<T: Clone + Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions.remove::<T>()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Small interceptors used by the chain and router tests.

    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::{Arc, Mutex};

    /// Records the order in which hooks run.
    #[derive(Clone, Default)]
    pub struct Journal(pub Arc<Mutex<Vec<String>>>);

    impl Journal {
        pub fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        pub fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    /// Logs both phases and tags the response with `x-seen-<label>`.
    pub struct Tracer {
        pub label: &'static str,
        pub journal: Journal,
    }

    #[async_trait]
    impl Interceptor for Tracer {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn before(&self, _request: &mut Parts, _config: ConfigSlot<'_>) -> ControlFlow<Response> {
            self.journal.push(format!("before:{}", self.label));
            ControlFlow::Continue(())
        }

        async fn commit(
            &self,
            _request: &RequestHead,
            response: &mut CommitResponse<'_>,
            _config: ConfigSlot<'_>,
        ) {
            self.journal.push(format!("commit:{}", self.label));
            let name = HeaderName::from_bytes(format!("x-seen-{}", self.label).as_bytes()).unwrap();
            response.append_header(name, HeaderValue::from_static("1"));
        }
    }

    /// Rejects with 403 unless the request carries `x-pass`, or the route
    /// opts out with [`SkipGate`].
    pub struct Gate {
        pub journal: Journal,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct SkipGate;

    impl InterceptorConfig for SkipGate {
        type Target = Gate;
    }

    #[async_trait]
    impl Interceptor for Gate {
        fn name(&self) -> &'static str {
            "gate"
        }

        async fn before(&self, request: &mut Parts, config: ConfigSlot<'_>) -> ControlFlow<Response> {
            self.journal.push("before:gate");
            if config.get::<SkipGate>().is_some() || request.headers.contains_key("x-pass") {
                return ControlFlow::Continue(());
            }
            ControlFlow::Break((StatusCode::FORBIDDEN, "gate closed").into_response())
        }

        async fn commit(
            &self,
            _request: &RequestHead,
            _response: &mut CommitResponse<'_>,
            _config: ConfigSlot<'_>,
        ) {
            self.journal.push("commit:gate");
        }
    }
}
