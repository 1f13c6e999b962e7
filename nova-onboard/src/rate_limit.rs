//! Per-IP rate limiting for the employee routes

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

/// Registrations per IP per window
const REGISTER_MAX: u32 = 10;
/// PIN checks per IP per window (the form checks as the user types)
const PIN_CHECK_MAX: u32 = 60;
const WINDOW: Duration = Duration::from_secs(60);
/// Entries idle for longer are dropped by `cleanup`
const IDLE_CUTOFF: Duration = Duration::from_secs(300);

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed
    pub async fn check(&self, route: &'static str, ip: &str, max_requests: u32, window: Duration) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < IDLE_CUTOFF);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// X-Forwarded-For first (reverse proxy), then the peer address
fn client_ip(request: &Request) -> String {
    if let Some(first) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        && !first.is_empty()
    {
        return first.to_owned();
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(state: &AppState, route: &'static str, max: u32, request: Request, next: Next) -> Response {
    let ip = client_ip(&request);
    if !state.rate_limiter.check(route, &ip, max, WINDOW).await {
        tracing::warn!(route, ip = %ip, "Rate limit exceeded");
        return AppError::too_many_requests().into_response();
    }
    next.run(request).await
}

/// Registration and PIN-check limits on `/api/employees`
pub async fn employees_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::POST {
        limit(&state, "register", REGISTER_MAX, request, next).await
    } else {
        limit(&state, "pin_check", PIN_CHECK_MAX, request, next).await
    }
}
