//! Fixed-window request limiter keyed by client address.

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::security::inspector::{Inspector, Rejection, RequestContext, Verdict};

/// Expired windows are swept once every this many admissions.
const PURGE_INTERVAL: u64 = 1024;

/// Key used when no client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    window_start: Instant,
    count: u32,
    limit: u32,
}

/// Per-key fixed-window counters.
///
/// The increment and the comparison against the limit happen while the map
/// entry is locked, so concurrent requests for one key are never undercounted.
pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    limit: u32,
    window: Duration,
    admissions: AtomicU64,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
            admissions: AtomicU64::new(0),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    pub fn admit(&self, key: &str) -> Admission {
        self.admit_at(key, Instant::now())
    }

    /// Counts one request for `key` at `now`.
    pub fn admit_at(&self, key: &str, now: Instant) -> Admission {
        if self.admissions.fetch_add(1, Ordering::Relaxed) % PURGE_INTERVAL == PURGE_INTERVAL - 1 {
            self.purge_expired(now);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(RateWindow {
            window_start: now,
            count: 0,
            limit: self.limit,
        });
        let window = entry.value_mut();

        let elapsed = now.saturating_duration_since(window.window_start);
        if elapsed >= self.window {
            window.window_start = now;
            window.count = 0;
        }

        if window.count >= window.limit {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(window.window_start));
            return Admission::Limited { retry_after };
        }

        window.count += 1;
        Admission::Allowed {
            remaining: window.limit - window.count,
        }
    }

    /// Drops every window that has elapsed at `now`.
    pub fn purge_expired(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) < window);
    }
}

/// Pipeline stage enforcing the limiter.
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
    behind_proxy: bool,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>, behind_proxy: bool) -> Self {
        Self {
            limiter,
            behind_proxy,
        }
    }

    /// Client address: forwarding headers when behind a trusted proxy,
    /// otherwise the socket peer.
    fn client_key(&self, ctx: &RequestContext) -> String {
        if self.behind_proxy {
            if let Some(ip) = ctx
                .header_str("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return ip.to_string();
            }
            if let Some(ip) = ctx
                .header_str("x-real-ip")
                .map(str::trim)
                .filter(|v| !v.is_empty())
            {
                return ip.to_string();
            }
        }

        ctx.parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

#[async_trait]
impl Inspector for RateLimit {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn inspect(&self, ctx: &mut RequestContext) -> Verdict {
        let key = self.client_key(ctx);

        let verdict = match self.limiter.admit(&key) {
            Admission::Allowed { .. } => Verdict::Continue,
            Admission::Limited { retry_after } => {
                let retry_after = retry_after.as_secs().max(1);
                tracing::warn!(
                    client = %key,
                    limit = self.limiter.limit(),
                    retry_after,
                    "Rate limit exceeded"
                );
                metrics::counter!("rate_limit_rejections_total").increment(1);
                Verdict::Reject(Rejection::RateExceeded { retry_after })
            }
        };

        ctx.client_key = Some(key);
        verdict
    }
}
