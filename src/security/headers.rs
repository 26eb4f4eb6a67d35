//! Hardening headers stamped onto every response.

use async_trait::async_trait;
use axum::{
    http::{HeaderMap, HeaderName, HeaderValue},
    response::Response,
};

use crate::security::inspector::{Inspector, RequestContext, Verdict};

const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains",
    ),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=()",
    ),
    (
        "content-security-policy",
        "default-src 'self'; script-src 'self'; style-src 'self'; frame-ancestors 'none'",
    ),
    ("x-xss-protection", "1; mode=block"),
];

/// Inserts the hardening headers, replacing any value set downstream.
pub fn apply(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

/// Stage that never rejects and stamps headers on the way out.
pub struct SecurityHeaders;

#[async_trait]
impl Inspector for SecurityHeaders {
    fn name(&self) -> &'static str {
        "security_headers"
    }

    async fn inspect(&self, _ctx: &mut RequestContext) -> Verdict {
        Verdict::Continue
    }

    fn decorate(&self, _ctx: &RequestContext, response: &mut Response) {
        apply(response.headers_mut());
    }
}
