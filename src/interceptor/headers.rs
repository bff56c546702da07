//! Static security headers

use std::ops::ControlFlow;

use axum::async_trait;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::request::Parts;
use axum::response::Response;

use super::{CommitResponse, ConfigSlot, Interceptor, InterceptorConfig, RequestHead};

/// Content security policy for the server-rendered pages, which load no
/// scripts and only same-origin styles.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; object-src 'none'; base-uri 'none'; frame-ancestors 'none'; form-action 'self'";

/// Two years, subdomains included.
pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=63072000; includeSubDomains";

/// Adds a fixed set of security headers to every response, unless the
/// handler already set them.
///
/// The default set covers content sniffing, framing, referrers, the
/// content security policy and cross-origin opener isolation.
/// Strict-Transport-Security is only added with [`SecurityHeaders::with_hsts`],
/// since browsers ignore it over plain http.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            headers: vec![
                (
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ),
                (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
                (
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("same-origin"),
                ),
                (
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                ),
                (
                    HeaderName::from_static("cross-origin-opener-policy"),
                    HeaderValue::from_static("same-origin"),
                ),
            ],
        }
    }
}

impl SecurityHeaders {
    /// Headers for a deployment served over `protocol`.
    pub fn for_protocol(protocol: &str) -> Self {
        let headers = Self::default();
        if protocol.eq_ignore_ascii_case("https") {
            headers.with_hsts()
        } else {
            headers
        }
    }

    /// Also send Strict-Transport-Security.
    pub fn with_hsts(mut self) -> Self {
        self.headers.push((
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(STRICT_TRANSPORT_SECURITY),
        ));
        self
    }
}

/// Route opt-out for [`SecurityHeaders`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipSecurityHeaders;

impl InterceptorConfig for SkipSecurityHeaders {
    type Target = SecurityHeaders;
}

#[async_trait]
impl Interceptor for SecurityHeaders {
    fn name(&self) -> &'static str {
        "security_headers"
    }

    async fn before(&self, _request: &mut Parts, _config: ConfigSlot<'_>) -> ControlFlow<Response> {
        ControlFlow::Continue(())
    }

    async fn commit(
        &self,
        _request: &RequestHead,
        response: &mut CommitResponse<'_>,
        config: ConfigSlot<'_>,
    ) {
        if config.get::<SkipSecurityHeaders>().is_some() {
            return;
        }
        for (name, value) in &self.headers {
            response.insert_header_if_absent(name.clone(), value.clone());
        }
    }
}
