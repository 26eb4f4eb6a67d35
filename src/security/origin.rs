//! Cross-origin policy: preflight answers and allow-origin headers.

use async_trait::async_trait;
use axum::{
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::security::inspector::{Inspector, Rejection, RequestContext, Verdict};

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Authorization, Content-Type";
const MAX_AGE_SECONDS: &str = "600";

/// Origin allow-list stage.
///
/// Requests without an `Origin` header are untouched. Preflights from a
/// listed origin are answered with `204`, from any other origin with `403`.
/// Simple requests from a listed origin get `Access-Control-Allow-Origin`.
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        let allowed = allowed
            .into_iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.iter().any(|a| a == "*" || a == origin)
    }
}

fn is_preflight(ctx: &RequestContext) -> bool {
    *ctx.method() == Method::OPTIONS
        && ctx
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

#[async_trait]
impl Inspector for OriginPolicy {
    fn name(&self) -> &'static str {
        "origin_policy"
    }

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict {
        let Some(origin) = ctx.headers().get(header::ORIGIN).cloned() else {
            return Verdict::Continue;
        };

        let allowed = origin.to_str().is_ok_and(|o| self.is_allowed(o));

        if is_preflight(ctx) {
            if !allowed {
                tracing::warn!(origin = ?origin, "Preflight from disallowed origin");
                return Verdict::Reject(Rejection::OriginDenied);
            }

            let mut response = StatusCode::NO_CONTENT.into_response();
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            );
            headers.insert(
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from_static(MAX_AGE_SECONDS),
            );
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
            return Verdict::Respond(response);
        }

        if allowed {
            ctx.allowed_origin = Some(origin);
        }

        Verdict::Continue
    }

    fn decorate(&self, ctx: &RequestContext, response: &mut Response) {
        if let Some(ref origin) = ctx.allowed_origin {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}
