//! Request shape validation: size ceiling, JSON well-formedness and
//! forwarding-header sanity.

use async_trait::async_trait;
use axum::http::{Method, StatusCode, header};

use crate::security::inspector::{Inspector, Rejection, RequestContext, Verdict};
use crate::security::signatures::{self, generic_suspicious};

/// Forwarding headers checked against the generic-suspicious signatures.
const FORWARDING_HEADERS: &[&str] = &["x-forwarded-for", "x-real-ip", "x-forwarded-host"];

/// Default body ceiling (10 MiB).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

pub struct RequestShape {
    max_request_bytes: usize,
}

impl RequestShape {
    pub fn new(max_request_bytes: usize) -> Self {
        Self { max_request_bytes }
    }
}

/// Methods whose bodies are parsed and scanned.
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// `application/json` and structured `+json` media types.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn is_json(ctx: &RequestContext) -> bool {
    ctx.header_str(header::CONTENT_TYPE.as_str())
        .is_some_and(is_json_content_type)
}

#[async_trait]
impl Inspector for RequestShape {
    fn name(&self) -> &'static str {
        "request_shape"
    }

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict {
        let declared = ctx
            .header_str(header::CONTENT_LENGTH.as_str())
            .and_then(|v| v.parse::<u64>().ok());

        if declared.is_some_and(|len| len > self.max_request_bytes as u64) {
            tracing::warn!(
                declared_bytes = declared,
                limit = self.max_request_bytes,
                "Request too large"
            );
            return Verdict::Reject(Rejection::MalformedInput {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "Request too large",
            });
        }

        if ctx.buffer_body(self.max_request_bytes).await.is_err() {
            tracing::warn!(limit = self.max_request_bytes, "Request body exceeded limit");
            return Verdict::Reject(Rejection::MalformedInput {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "Request too large",
            });
        }

        if carries_body(ctx.method())
            && is_json(ctx)
            && let Some(body) = ctx.body()
            && !body.is_empty()
            && serde_json::from_slice::<serde::de::IgnoredAny>(body).is_err()
        {
            tracing::warn!(path = ctx.path(), "Malformed JSON detected");
            return Verdict::Reject(Rejection::MalformedInput {
                status: StatusCode::BAD_REQUEST,
                message: "Invalid JSON format",
            });
        }

        for name in FORWARDING_HEADERS {
            for value in ctx.headers().get_all(*name) {
                let value = String::from_utf8_lossy(value.as_bytes());
                if let Some(sig) = signatures::matches(&value, generic_suspicious()) {
                    tracing::warn!(
                        header = name,
                        class = %sig.class,
                        signature = sig.index,
                        "Suspicious content in forwarding header"
                    );
                    return Verdict::Reject(Rejection::MalformedInput {
                        status: StatusCode::BAD_REQUEST,
                        message: "Invalid request",
                    });
                }
            }
        }

        Verdict::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Request};

    fn ctx(method: Method, content_type: Option<&str>, body: &'static str) -> RequestContext {
        let mut builder = Request::builder().method(method).uri("/api/v1/products");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        RequestContext::new(builder.body(Body::from(body)).unwrap())
    }

    fn rejected_with(verdict: Verdict) -> Option<StatusCode> {
        match verdict {
            Verdict::Reject(Rejection::MalformedInput { status, .. }) => Some(status),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_valid_json_passes() {
        let mut ctx = ctx(Method::POST, Some("application/json"), r#"{"a":1}"#);
        let verdict = RequestShape::new(1024).inspect(&mut ctx).await;
        assert!(matches!(verdict, Verdict::Continue));
        assert_eq!(ctx.body().map(|b| b.len()), Some(7));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let mut ctx = ctx(Method::POST, Some("application/json"), r#"{"a":"#);
        let verdict = RequestShape::new(1024).inspect(&mut ctx).await;
        assert_eq!(rejected_with(verdict), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_malformed_structured_json_rejected() {
        let mut ctx = ctx(Method::PATCH, Some("application/vnd.api+json"), r#"{"a":"#);
        let verdict = RequestShape::new(1024).inspect(&mut ctx).await;
        assert_eq!(rejected_with(verdict), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_json_content_types() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/plain"));
        assert!(!is_json_content_type("multipart/form-data; boundary=json"));
    }

    #[tokio::test]
    async fn test_json_not_parsed_for_get() {
        let mut ctx = ctx(Method::GET, Some("application/json"), "not json");
        let verdict = RequestShape::new(1024).inspect(&mut ctx).await;
        assert!(matches!(verdict, Verdict::Continue));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut ctx = ctx(Method::POST, Some("text/plain"), "0123456789abcdef");
        let verdict = RequestShape::new(8).inspect(&mut ctx).await;
        assert_eq!(rejected_with(verdict), Some(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[tokio::test]
    async fn test_declared_length_over_ceiling_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-length", "999999")
            .body(Body::empty())
            .unwrap();
        let mut ctx = RequestContext::new(request);
        let verdict = RequestShape::new(1024).inspect(&mut ctx).await;
        assert_eq!(rejected_with(verdict), Some(StatusCode::PAYLOAD_TOO_LARGE));
    }

    #[tokio::test]
    async fn test_suspicious_forwarding_header_rejected() {
        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "1.2.3.4' OR 1=1 --")
            .body(Body::empty())
            .unwrap();
        let mut ctx = RequestContext::new(request);
        let verdict = RequestShape::new(1024).inspect(&mut ctx).await;
        assert_eq!(rejected_with(verdict), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_plain_forwarding_header_passes() {
        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-forwarded-host", "api.example.com")
            .body(Body::empty())
            .unwrap();
        let mut ctx = RequestContext::new(request);
        let verdict = RequestShape::new(1024).inspect(&mut ctx).await;
        assert!(matches!(verdict, Verdict::Continue));
    }
}
