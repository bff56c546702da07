//! Route registration with interceptors
//!
//! Every route registered here runs through the shared chain with the
//! configuration it declared at registration time.

use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::handler::Handler;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodFilter, on};
use tower::{Layer, Service};

use super::{InterceptorChain, RouteConfig};

#[derive(Clone)]
struct InterceptedRoute {
    chain: Arc<InterceptorChain>,
    config: Arc<RouteConfig>,
}

async fn intercept(State(route): State<InterceptedRoute>, request: Request, next: Next) -> Response {
    route.chain.execute(&route.config, request, next).await
}

/// Router whose routes all pass through one [`InterceptorChain`].
///
/// # Usage
/// ```ignore
/// let app = InterceptedRouter::new(chain)
///     .handle(MethodFilter::GET, "/notes/", list_notes, RouteConfig::new())
///     .handle(MethodFilter::POST, "/login", login, RouteConfig::new().with(SkipAuth))
///     .into_router();
/// ```
pub struct InterceptedRouter<S = ()> {
    router: Router<S>,
    chain: Arc<InterceptorChain>,
}

impl<S> InterceptedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(chain: InterceptorChain) -> Self {
        Self {
            router: Router::new(),
            chain: Arc::new(chain),
        }
    }

    fn route_state(&self, config: RouteConfig) -> InterceptedRoute {
        InterceptedRoute {
            chain: self.chain.clone(),
            config: Arc::new(config),
        }
    }

    /// Register `handler` for `method` on `path`.
    pub fn handle<H, T>(self, method: MethodFilter, path: &str, handler: H, config: RouteConfig) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        tracing::debug!(path, ?config, "registering route");
        let layer = middleware::from_fn_with_state(self.route_state(config), intercept);
        Self {
            router: self.router.route(path, on(method, handler).layer(layer)),
            chain: self.chain,
        }
    }

    /// Mount `service` under the `path` prefix, e.g. a static file server.
    pub fn nest_service<T>(self, path: &str, service: T, config: RouteConfig) -> Self
    where
        T: Service<Request, Error = Infallible> + Clone + Send + 'static,
        T::Response: IntoResponse,
        T::Future: Send + 'static,
    {
        tracing::debug!(path, ?config, "registering service");
        let layer = middleware::from_fn_with_state(self.route_state(config), intercept);
        Self {
            router: self.router.nest_service(path, layer.layer(service)),
            chain: self.chain,
        }
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}
