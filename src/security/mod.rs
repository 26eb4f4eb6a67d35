//! Inbound request security inspection.
//!
//! Every request passes through an ordered [`pipeline::Pipeline`] before it
//! reaches a handler:
//!
//! 1. fault boundary ([`pipeline::layer`])
//! 2. hardening headers ([`headers`])
//! 3. request shape: size ceiling, JSON, forwarding headers ([`shape`])
//! 4. XSS and SQL-injection signatures over query and body ([`content`])
//! 5. HTTPS redirect ([`transport`])
//! 6. origin policy ([`origin`])
//! 7. per-client rate limit ([`rate_limit`])
//! 8. bearer authentication and role authorization ([`auth`])
//!
//! Any stage may end the request early. The signature sets in [`signatures`]
//! are also used by field-level validation in [`crate::api::validation`].

pub mod auth;
pub mod content;
pub mod decoder;
pub mod headers;
pub mod inspector;
pub mod origin;
pub mod pipeline;
pub mod rate_limit;
pub mod shape;
pub mod signatures;
pub mod transport;

pub use auth::{AccessPolicy, Requirement};
pub use inspector::{Inspector, Rejection, RequestContext, Verdict};
pub use pipeline::{Pipeline, PipelineSettings};
pub use rate_limit::{Admission, RateLimiter};
