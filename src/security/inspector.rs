//! Stage contract for the inspection pipeline.

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, Method, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::domain::identity::Identity;
use crate::error::AppError;
use crate::security::auth::Requirement;
use crate::security::signatures::ThreatClass;

/// Where an inspected value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionSource {
    Query,
    Body,
    Header,
}

impl InspectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionSource::Query => "query",
            InspectionSource::Body => "body",
            InspectionSource::Header => "header",
        }
    }
}

impl fmt::Display for InspectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage terminated a request.
#[derive(Debug)]
pub enum Rejection {
    /// Oversized or unparseable request.
    MalformedInput { status: StatusCode, message: &'static str },
    ThreatSignatureMatch {
        class: ThreatClass,
        source: InspectionSource,
    },
    RateExceeded { retry_after: u64 },
    AuthenticationFailure { reason: &'static str },
    AuthorizationFailure,
    OriginDenied,
    UnhandledFault,
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MalformedInput { status, message } => {
                if status == StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::payload_too_large(message, json!({}))
                } else {
                    AppError::bad_request(message, json!({}))
                }
            }
            Rejection::ThreatSignatureMatch { .. } => AppError::InvalidInput,
            Rejection::RateExceeded { retry_after } => AppError::too_many_requests(retry_after),
            Rejection::AuthenticationFailure { reason } => {
                AppError::unauthorized("Unauthorized", json!({ "reason": reason }))
            }
            Rejection::AuthorizationFailure => {
                AppError::forbidden("Forbidden", json!({ "reason": "Insufficient role" }))
            }
            Rejection::OriginDenied => {
                AppError::forbidden("Origin not allowed", json!({}))
            }
            Rejection::UnhandledFault => {
                AppError::internal("Unhandled fault in request pipeline", json!({}))
            }
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Outcome of a single stage.
pub enum Verdict {
    Continue,
    Reject(Rejection),
    /// Terminal non-error response, such as a redirect or a preflight answer.
    Respond(Response),
}

enum BodyState {
    Pending(Body),
    Buffered(Bytes),
    Taken,
}

/// Per-request state threaded through the stages.
///
/// Holds the request head, the body (buffered at most once) and whatever the
/// stages resolve along the way.
pub struct RequestContext {
    pub parts: Parts,
    body: BodyState,
    pub client_key: Option<String>,
    pub requirement: Requirement,
    pub identity: Option<Identity>,
    pub allowed_origin: Option<axum::http::HeaderValue>,
}

/// Body could not be buffered within the ceiling.
#[derive(Debug)]
pub struct BodyTooLarge;

impl RequestContext {
    pub fn new(request: Request) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            parts,
            body: BodyState::Pending(body),
            client_key: None,
            requirement: Requirement::Public,
            identity: None,
            allowed_origin: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Buffers the body, reading at most `limit` bytes.
    ///
    /// Subsequent calls return the already buffered bytes.
    pub async fn buffer_body(&mut self, limit: usize) -> Result<&Bytes, BodyTooLarge> {
        if matches!(self.body, BodyState::Pending(_))
            && let BodyState::Pending(body) = std::mem::replace(&mut self.body, BodyState::Taken)
        {
            let bytes = axum::body::to_bytes(body, limit)
                .await
                .map_err(|_| BodyTooLarge)?;
            self.body = BodyState::Buffered(bytes);
        }

        match self.body {
            BodyState::Buffered(ref bytes) => Ok(bytes),
            _ => Err(BodyTooLarge),
        }
    }

    /// The buffered body, if a stage has buffered it.
    pub fn body(&self) -> Option<&Bytes> {
        match self.body {
            BodyState::Buffered(ref bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Rebuilds the request to forward downstream.
    ///
    /// The forwarded body is byte-for-byte what was received. The resolved
    /// identity is attached as a request extension.
    pub fn take_request(&mut self) -> Request {
        let body = match std::mem::replace(&mut self.body, BodyState::Taken) {
            BodyState::Pending(body) => body,
            BodyState::Buffered(bytes) => {
                let body = Body::from(bytes.clone());
                self.body = BodyState::Buffered(bytes);
                body
            }
            BodyState::Taken => Body::empty(),
        };

        let mut request = Request::new(body);
        *request.method_mut() = self.parts.method.clone();
        *request.uri_mut() = self.parts.uri.clone();
        *request.version_mut() = self.parts.version;
        *request.headers_mut() = self.parts.headers.clone();
        *request.extensions_mut() = std::mem::take(&mut self.parts.extensions);

        if let Some(ref identity) = self.identity {
            request.extensions_mut().insert(identity.clone());
        }

        request
    }
}

/// One stage of the inspection pipeline.
#[async_trait]
pub trait Inspector: Send + Sync {
    /// Stable stage name used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict;

    /// Runs on the way out for every stage that was entered, including the one
    /// that produced a terminal response.
    fn decorate(&self, _ctx: &RequestContext, _response: &mut Response) {}
}
