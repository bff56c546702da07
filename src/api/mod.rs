//! API layer
//!
//! HTTP handlers for:
//! - Login, logout and the landing page
//! - Notes
//! - Metrics (Prometheus)
//!
//! Every route is registered through [`InterceptedRouter`], so each one runs
//! behind the interceptor chain with the configuration declared here.

pub mod metrics;
mod notes;
pub mod pages;
mod session;

use std::sync::Arc;

use axum::Router;
use axum::routing::MethodFilter;
use tower_http::services::ServeDir;

use crate::AppState;
use crate::auth::{AuthInterceptor, SessionCookie, SessionStore, SkipAuth};
use crate::interceptor::{
    FetchMetadata, InterceptedRouter, InterceptorChain, RouteConfig, SecurityHeaders,
};

/// Interceptors applied to every registered route, in Before order.
pub fn interceptor_chain(state: &AppState) -> InterceptorChain {
    let store: Arc<dyn SessionStore> = state.db.clone();
    InterceptorChain::new()
        .intercept(SecurityHeaders::for_protocol(&state.config.server.protocol))
        .intercept(FetchMetadata)
        .intercept(AuthInterceptor::new(
            store,
            SessionCookie::from_config(&state.config),
        ))
}

/// Create the application routes.
///
/// Routes without [`SkipAuth`] are only reachable by logged-in callers.
pub fn app_router(state: AppState) -> Router {
    let public = || RouteConfig::new().with(SkipAuth);

    InterceptedRouter::new(interceptor_chain(&state))
        .handle(MethodFilter::GET, "/", session::index, public())
        .handle(MethodFilter::POST, "/login", session::login, public())
        .handle(MethodFilter::POST, "/logout", session::logout, RouteConfig::new())
        .handle(MethodFilter::GET, "/notes/", notes::list_notes, RouteConfig::new())
        .handle(MethodFilter::POST, "/notes", notes::save_note, RouteConfig::new())
        .handle(MethodFilter::GET, "/health", health_check, public())
        .handle(
            MethodFilter::GET,
            "/metrics",
            metrics::metrics_handler,
            RouteConfig::new(),
        )
        .nest_service(
            "/static",
            ServeDir::new(&state.config.server.static_dir),
            public(),
        )
        .into_router()
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
