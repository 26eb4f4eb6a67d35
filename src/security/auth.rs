//! Route access policy and the authentication/authorization stages.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::Method};
use axum_auth::AuthBearer;
use std::sync::Arc;

use crate::application::services::TokenService;
use crate::domain::entities::ROLE_ADMIN;
use crate::security::inspector::{Inspector, Rejection, RequestContext, Verdict};

/// What a route demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Role(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`: exactly one segment.
    Any,
    /// Trailing `**`: zero or more segments.
    Rest,
}

#[derive(Debug, Clone)]
struct AccessRule {
    method: Option<Method>,
    segments: Vec<Segment>,
    requirement: Requirement,
}

impl AccessRule {
    fn matches(&self, method: &Method, path: &[&str]) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }

        let mut remaining = path.iter();
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Any => {
                    if remaining.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(lit) => {
                    if remaining.next() != Some(&lit.as_str()) {
                        return false;
                    }
                }
            }
        }
        remaining.next().is_none()
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Ordered route protection table. First matching rule wins; routes no rule
/// matches are public.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule. `method` of `None` matches every method.
    ///
    /// In `pattern`, `*` matches one path segment and a trailing `**` matches
    /// any remainder, including none.
    pub fn rule(mut self, method: Option<Method>, pattern: &str, requirement: Requirement) -> Self {
        let segments = split_path(pattern)
            .into_iter()
            .map(|s| match s {
                "*" => Segment::Any,
                "**" => Segment::Rest,
                lit => Segment::Literal(lit.to_string()),
            })
            .collect();

        self.rules.push(AccessRule {
            method,
            segments,
            requirement,
        });
        self
    }

    /// Protection table for the v1 API.
    pub fn standard() -> Self {
        let admin = || Requirement::Role(ROLE_ADMIN.to_string());

        Self::new()
            .rule(Some(Method::POST), "/api/v1/auth/register", Requirement::Public)
            .rule(Some(Method::POST), "/api/v1/auth/login", Requirement::Public)
            .rule(None, "/api/v1/auth/**", Requirement::Authenticated)
            .rule(
                Some(Method::GET),
                "/api/v1/users/public-search",
                Requirement::Public,
            )
            .rule(None, "/api/v1/users/**", admin())
            .rule(Some(Method::GET), "/api/v1/products/**", Requirement::Public)
            .rule(None, "/api/v1/products/**", admin())
            .rule(None, "/api/v1/files/**", Requirement::Authenticated)
    }

    pub fn requirement(&self, method: &Method, path: &str) -> Requirement {
        let segments = split_path(path);
        self.rules
            .iter()
            .find(|r| r.matches(method, &segments))
            .map(|r| r.requirement.clone())
            .unwrap_or(Requirement::Public)
    }
}

/// Resolves the caller identity from the bearer token.
///
/// Protected routes without a valid token are rejected with `401`. On public
/// routes a bad or missing token leaves the request anonymous.
pub struct Authenticate {
    policy: AccessPolicy,
    tokens: Arc<TokenService>,
}

impl Authenticate {
    pub fn new(policy: AccessPolicy, tokens: Arc<TokenService>) -> Self {
        Self { policy, tokens }
    }
}

fn reject_unauthenticated(reason: &'static str, path: &str) -> Verdict {
    tracing::warn!(path, reason, "Authentication failed");
    metrics::counter!("auth_failures_total").increment(1);
    Verdict::Reject(Rejection::AuthenticationFailure { reason })
}

#[async_trait]
impl Inspector for Authenticate {
    fn name(&self) -> &'static str {
        "authentication"
    }

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict {
        let requirement = self.policy.requirement(ctx.method(), ctx.path());
        let protected = requirement != Requirement::Public;
        ctx.requirement = requirement;

        let token = match AuthBearer::from_request_parts(&mut ctx.parts, &()).await {
            Ok(AuthBearer(token)) => token,
            Err(_) if protected => {
                return reject_unauthenticated(
                    "Authorization header is missing or invalid",
                    ctx.path(),
                );
            }
            Err(_) => return Verdict::Continue,
        };

        match self.tokens.verify(&token) {
            Ok(identity) => {
                tracing::debug!(subject = identity.subject_id, "Authenticated");
                ctx.identity = Some(identity);
                Verdict::Continue
            }
            Err(e) if protected => {
                tracing::debug!(error = %e, "Token verification failed");
                reject_unauthenticated("Invalid or expired token", ctx.path())
            }
            Err(_) => Verdict::Continue,
        }
    }
}

/// Enforces role requirements for authenticated callers.
pub struct Authorize;

#[async_trait]
impl Inspector for Authorize {
    fn name(&self) -> &'static str {
        "authorization"
    }

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict {
        let Requirement::Role(ref role) = ctx.requirement else {
            return Verdict::Continue;
        };

        match ctx.identity {
            Some(ref identity) if identity.has_role(role) => Verdict::Continue,
            Some(ref identity) => {
                tracing::warn!(
                    subject = identity.subject_id,
                    required = %role,
                    path = ctx.path(),
                    "Authorization failed"
                );
                Verdict::Reject(Rejection::AuthorizationFailure)
            }
            None => reject_unauthenticated("Authentication required", ctx.path()),
        }
    }
}
