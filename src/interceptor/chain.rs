//! Two-phase chain runtime

use std::any::TypeId;
use std::ops::ControlFlow;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::{CommitResponse, Interceptor, RequestHead, RouteConfig};
use crate::metrics::INTERCEPTOR_SHORT_CIRCUITS_TOTAL;

struct Registered {
    id: TypeId,
    interceptor: Box<dyn Interceptor>,
}

/// Ordered interceptors shared, read-only, by every request.
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Registered>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interceptor after the ones already present.
    pub fn intercept<I: Interceptor>(mut self, interceptor: I) -> Self {
        tracing::debug!(interceptor = interceptor.name(), "registering interceptor");
        self.interceptors.push(Registered {
            id: TypeId::of::<I>(),
            interceptor: Box::new(interceptor),
        });
        self
    }

    /// Run every Before hook in registration order.
    ///
    /// Returns the response of the first interceptor that answered the
    /// request, if any.
    pub async fn run_before(&self, request: &mut Parts, route: &RouteConfig) -> Option<Response> {
        for entry in &self.interceptors {
            let slot = route.slot_for(entry.id);
            if let ControlFlow::Break(response) = entry.interceptor.before(request, slot).await {
                let name = entry.interceptor.name();
                tracing::debug!(
                    interceptor = name,
                    status = %response.status(),
                    path = %request.uri.path(),
                    "request answered before handler"
                );
                INTERCEPTOR_SHORT_CIRCUITS_TOTAL
                    .with_label_values(&[name])
                    .inc();
                return Some(response);
            }
        }
        None
    }

    /// Run every Commit hook in reverse registration order.
    pub async fn run_commit(
        &self,
        request: &RequestHead,
        response: Response,
        route: &RouteConfig,
    ) -> Response {
        let (mut parts, body) = response.into_parts();
        {
            let mut view = CommitResponse::new(&mut parts.headers, &mut parts.extensions);
            for entry in self.interceptors.iter().rev() {
                let slot = route.slot_for(entry.id);
                entry.interceptor.commit(request, &mut view, slot).await;
            }
        }
        Response::from_parts(parts, body)
    }

    /// Run the full protocol around `next` for a route declaring `route`.
    pub async fn execute(&self, route: &RouteConfig, request: Request, next: Next) -> Response {
        let (mut parts, body) = request.into_parts();

        let answered = self.run_before(&mut parts, route).await;
        let head = RequestHead::snapshot(&parts);

        let response = match answered {
            Some(response) => response,
            None => next.run(Request::from_parts(parts, body)).await,
        };

        self.run_commit(&head, response, route).await
    }
}
