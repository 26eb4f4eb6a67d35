//! HTTPS redirect policy.

use async_trait::async_trait;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::security::inspector::{Inspector, Rejection, RequestContext, Verdict};

/// Redirects plain-HTTP requests to HTTPS with `308 Permanent Redirect`.
pub struct HttpsRedirect {
    require_https: bool,
    behind_proxy: bool,
}

impl HttpsRedirect {
    pub fn new(require_https: bool, behind_proxy: bool) -> Self {
        Self {
            require_https,
            behind_proxy,
        }
    }

    /// Scheme the client used: `X-Forwarded-Proto` behind a proxy, otherwise
    /// the request URI scheme, defaulting to `http`.
    fn effective_scheme(&self, ctx: &RequestContext) -> String {
        if self.behind_proxy
            && let Some(proto) = ctx.header_str("x-forwarded-proto")
            && let Some(first) = proto.split(',').next()
        {
            return first.trim().to_ascii_lowercase();
        }

        ctx.parts
            .uri
            .scheme_str()
            .unwrap_or("http")
            .to_ascii_lowercase()
    }
}

#[async_trait]
impl Inspector for HttpsRedirect {
    fn name(&self) -> &'static str {
        "https_redirect"
    }

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict {
        if !self.require_https || self.effective_scheme(ctx) == "https" {
            return Verdict::Continue;
        }

        let host = ctx
            .header_str(header::HOST.as_str())
            .map(str::to_string)
            .or_else(|| ctx.parts.uri.authority().map(|a| a.to_string()));

        let Some(host) = host else {
            return Verdict::Reject(Rejection::MalformedInput {
                status: StatusCode::BAD_REQUEST,
                message: "Missing Host header",
            });
        };

        let path_and_query = ctx
            .parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let location = format!("https://{host}{path_and_query}");
        let Ok(location) = HeaderValue::from_str(&location) else {
            return Verdict::Reject(Rejection::MalformedInput {
                status: StatusCode::BAD_REQUEST,
                message: "Invalid Host header",
            });
        };

        tracing::debug!(location = ?location, "Redirecting to HTTPS");

        let response: Response =
            (StatusCode::PERMANENT_REDIRECT, [(header::LOCATION, location)]).into_response();
        Verdict::Respond(response)
    }
}
