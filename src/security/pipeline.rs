//! Ordered execution of the inspection stages.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::application::services::TokenService;
use crate::security::auth::{AccessPolicy, Authenticate, Authorize};
use crate::security::content::ThreatInspector;
use crate::security::headers::{self, SecurityHeaders};
use crate::security::inspector::{Inspector, Rejection, RequestContext, Verdict};
use crate::security::origin::OriginPolicy;
use crate::security::rate_limit::{RateLimit, RateLimiter};
use crate::security::shape::RequestShape;
use crate::security::transport::HttpsRedirect;

/// Settings the standard pipeline is built from.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_request_bytes: usize,
    pub behind_proxy: bool,
    pub require_https: bool,
    pub allowed_origins: Vec<String>,
}

/// An ordered chain of inspectors run in front of every handler.
///
/// Each stage may pass the request on or end it with a terminal response.
/// Once a response exists, the response hooks of every stage that was entered
/// run in reverse order.
pub struct Pipeline {
    stages: Vec<Arc<dyn Inspector>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Inspector>>) -> Self {
        Self { stages }
    }

    /// Builds the fixed production chain: headers, shape, XSS, SQL injection,
    /// transport, origin, rate limit, authentication, authorization.
    pub fn standard(
        settings: &PipelineSettings,
        tokens: Arc<TokenService>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self::new(vec![
            Arc::new(SecurityHeaders),
            Arc::new(RequestShape::new(settings.max_request_bytes)),
            Arc::new(ThreatInspector::xss()),
            Arc::new(ThreatInspector::sql_injection()),
            Arc::new(HttpsRedirect::new(
                settings.require_https,
                settings.behind_proxy,
            )),
            Arc::new(OriginPolicy::new(settings.allowed_origins.clone())),
            Arc::new(RateLimit::new(limiter, settings.behind_proxy)),
            Arc::new(Authenticate::new(AccessPolicy::standard(), tokens)),
            Arc::new(Authorize),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs the chain, then `next` if every stage passed.
    pub async fn run(&self, request: Request, next: Next) -> Response {
        let mut ctx = RequestContext::new(request);
        let mut entered = 0;
        let mut terminal = None;

        for stage in &self.stages {
            entered += 1;
            match stage.inspect(&mut ctx).await {
                Verdict::Continue => {}
                Verdict::Reject(rejection) => {
                    metrics::counter!("security_rejections_total", "stage" => stage.name())
                        .increment(1);
                    terminal = Some(rejection.into_response());
                    break;
                }
                Verdict::Respond(response) => {
                    terminal = Some(response);
                    break;
                }
            }
        }

        let mut response = match terminal {
            Some(response) => response,
            None => next.run(ctx.take_request()).await,
        };

        for stage in self.stages[..entered].iter().rev() {
            stage.decorate(&ctx, &mut response);
        }

        response
    }
}

/// Middleware entry point and outermost fault boundary.
///
/// A panic anywhere in the chain or the handler becomes a generic `500`; the
/// detail is logged and never sent to the client.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .nest("/api/v1", api_routes())
///     .layer(middleware::from_fn_with_state(pipeline, security::pipeline::layer));
/// ```
pub async fn layer(State(pipeline): State<Arc<Pipeline>>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(pipeline.run(request, next))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());

            tracing::error!(%method, %path, %detail, "Unhandled fault while serving request");
            metrics::counter!("security_rejections_total", "stage" => "fault_boundary")
                .increment(1);

            let mut response = Rejection::UnhandledFault.into_response();
            headers::apply(response.headers_mut());
            response
        }
    }
}
