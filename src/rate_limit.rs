use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use tracing::warn;

use crate::api::ApiError;

pub const WINDOW: Duration = Duration::from_secs(60);

/// How often idle client keys are dropped from the map.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Global sliding-window limiter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    limit_per_window: u32,
    window: Duration,
    requests: Mutex<(HashMap<String, Vec<Instant>>, Instant)>,
}

impl RateLimiter {
    /// A limit of 0 disables limiting.
    pub fn new(limit_per_window: u32, window: Duration) -> Self {
        Self {
            limit_per_window,
            window,
            requests: Mutex::new((HashMap::new(), Instant::now())),
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        if self.limit_per_window == 0 {
            return true;
        }

        let now = Instant::now();
        let cutoff = now.checked_sub(self.window);
        let is_live = |t: &Instant| cutoff.map_or(true, |c| *t > c);

        let mut guard = self.requests.lock();
        let (requests, last_sweep) = &mut *guard;

        if last_sweep.elapsed() >= SWEEP_INTERVAL {
            requests.retain(|_, stamps| {
                stamps.retain(is_live);
                !stamps.is_empty()
            });
            *last_sweep = now;
        }

        let entry = requests.entry(key.to_owned()).or_default();
        entry.retain(is_live);

        if entry.len() >= self.limit_per_window as usize {
            return false;
        }
        entry.push(now);
        true
    }
}

/// Peer address when the server exposes it, else the first forwarded hop.
fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    if !limiter.allow(&key) {
        warn!(client = %key, "rate limit exceeded");
        return ApiError::TooManyRequests.into_response();
    }
    next.run(req).await
}
