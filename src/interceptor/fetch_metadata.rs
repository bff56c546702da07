//! Resource isolation from Fetch Metadata request headers
//!
//! Browsers label every request with `Sec-Fetch-Site`. Cross-site requests
//! are refused unless they are plain top-level navigations, which closes
//! cross-site form posts (login CSRF included) on every route, opted out of
//! authentication or not.

use std::ops::ControlFlow;

use axum::async_trait;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, Method};
use axum::response::{IntoResponse, Response};

use super::{ConfigSlot, Interceptor, InterceptorConfig};
use crate::error::AppError;

const SEC_FETCH_SITE: HeaderName = HeaderName::from_static("sec-fetch-site");
const SEC_FETCH_MODE: HeaderName = HeaderName::from_static("sec-fetch-mode");
const SEC_FETCH_DEST: HeaderName = HeaderName::from_static("sec-fetch-dest");

/// Refuses cross-site requests other than top-level navigations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchMetadata;

/// Route opt-out for [`FetchMetadata`], for endpoints meant to be embedded
/// or called from other sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipFetchMetadata;

impl InterceptorConfig for SkipFetchMetadata {
    type Target = FetchMetadata;
}

fn header<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Whether a request with these headers may proceed.
fn is_allowed(method: &Method, headers: &HeaderMap) -> bool {
    let site = match header(headers, &SEC_FETCH_SITE) {
        // Browsers without Fetch Metadata, and non-browser clients.
        None => return true,
        Some(site) => site,
    };

    if matches!(site, "same-origin" | "same-site" | "none") {
        return true;
    }

    let navigation = header(headers, &SEC_FETCH_MODE) == Some("navigate");
    let embedded = matches!(header(headers, &SEC_FETCH_DEST), Some("object" | "embed"));
    let safe_method = *method == Method::GET || *method == Method::HEAD;

    navigation && safe_method && !embedded
}

#[async_trait]
impl Interceptor for FetchMetadata {
    fn name(&self) -> &'static str {
        "fetch_metadata"
    }

    async fn before(&self, request: &mut Parts, config: ConfigSlot<'_>) -> ControlFlow<Response> {
        if config.get::<SkipFetchMetadata>().is_some() {
            return ControlFlow::Continue(());
        }

        if is_allowed(&request.method, &request.headers) {
            return ControlFlow::Continue(());
        }

        tracing::info!(
            method = %request.method,
            path = %request.uri.path(),
            site = header(&request.headers, &SEC_FETCH_SITE).unwrap_or_default(),
            "refusing cross-site request"
        );
        ControlFlow::Break(AppError::CrossSiteRequest.into_response())
    }
}
