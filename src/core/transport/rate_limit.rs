//! Fixed-window rate limiting for the REST tool routes.
//!
//! Clients are keyed by the first `x-forwarded-for` hop, then by the peer
//! address. Each key gets `max_requests` per window; the window starts with
//! the client's first request and resets once it has elapsed.

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::sync::Cache;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

use super::config::RateLimitConfig;

const FORWARDED_FOR: &str = "x-forwarded-for";
const MAX_TRACKED_CLIENTS: u64 = 100_000;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of one [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client's window resets.
    pub reset_after: Duration,
}

/// Per-client request counters.
pub struct RateLimiter {
    enabled: bool,
    window: Duration,
    max_requests: u32,
    windows: Cache<String, Arc<Mutex<Window>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_millis(config.window_ms.max(1));
        Self {
            enabled: config.enabled,
            window,
            max_requests: config.max_requests,
            // Idle clients drop out once their window can no longer matter.
            windows: Cache::builder()
                .max_capacity(MAX_TRACKED_CLIENTS)
                .time_to_idle(window)
                .build(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count one request for `client` and decide whether it may proceed.
    pub fn check(&self, client: &str) -> RateDecision {
        if !self.enabled {
            return RateDecision {
                allowed: true,
                limit: self.max_requests,
                remaining: self.max_requests,
                reset_after: Duration::ZERO,
            };
        }

        let now = Instant::now();
        let slot = self.windows.get_with(client.to_string(), || {
            Arc::new(Mutex::new(Window {
                started: now,
                count: 0,
            }))
        });
        let mut window = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        window.count = window.count.saturating_add(1);

        RateDecision {
            allowed: window.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.count),
            reset_after: self.window.saturating_sub(now.duration_since(window.started)),
        }
    }
}

/// Key a request by its first forwarded hop, else its peer address.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware applied to the `/tools` routes.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(request.headers(), peer);
    let decision = limiter.check(&client);

    if !decision.allowed {
        warn!(
            "Rate limit exceeded: {} {} client={}",
            request.method(),
            request.uri().path(),
            client
        );
        return too_many_requests(decision);
    }

    let mut response = next.run(request).await;
    set_limit_headers(response.headers_mut(), decision);
    response
}

fn too_many_requests(decision: RateDecision) -> Response {
    let body = Json(json!({
        "success": false,
        "error": {
            "code": "rate_limited",
            "message": "Too many requests, please try again later.",
        }
    }));
    let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    set_limit_headers(response.headers_mut(), decision);
    let retry_after = decision.reset_after.as_secs_f64().ceil() as u64;
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after.max(1)));
    response
}

fn set_limit_headers(headers: &mut HeaderMap, decision: RateDecision) {
    headers.insert("ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "ratelimit-reset",
        HeaderValue::from(decision.reset_after.as_secs()),
    );
}
