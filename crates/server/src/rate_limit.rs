//! Fixed-window request limiting keyed by client address.
//!
//! Every API route shares one budget per address. Allowed responses carry the
//! `x-ratelimit-*` headers; a caller over budget gets `429 rate_limited` with
//! `Retry-After` and the handler never runs.

use crate::config::RateLimitConfig;
use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const X_RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Expired windows are swept once this many addresses are tracked.
const CLEANUP_THRESHOLD: usize = 10_000;

/// Outcome of counting one request against an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub is_limited: bool,
    pub limit: u32,
    /// Requests left in the current window after this one
    pub remaining: u32,
    /// Whole seconds until the current window closes
    pub reset_after_secs: u64,
}

impl RateLimitStatus {
    fn write_headers(&self, headers: &mut HeaderMap) {
        headers.insert(X_RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(X_RATE_LIMIT_RESET, HeaderValue::from(self.reset_after_secs));
        if self.is_limited {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(self.reset_after_secs));
        }
    }
}

/// Per-address request counters: address -> (count, window start).
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<DashMap<IpAddr, (u32, Instant)>>,
    limit: u32,
    window: Duration,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Arc::new(DashMap::new()),
            limit: config.max_requests,
            window: Duration::from_secs(config.window_secs),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Count one request from `client` and report whether it is over budget.
    pub fn check(&self, client: IpAddr) -> RateLimitStatus {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> RateLimitStatus {
        let mut entry = self.state.entry(client).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) >= self.window {
            *count = 0;
            *window_start = now;
        }

        let is_limited = *count >= self.limit;
        if !is_limited {
            *count += 1;
        }
        let remaining = self.limit.saturating_sub(*count);
        let reset = self.window.saturating_sub(now.duration_since(*window_start));
        drop(entry);

        if self.state.len() > CLEANUP_THRESHOLD {
            self.evict_expired(now);
        }

        RateLimitStatus {
            is_limited,
            limit: self.limit,
            remaining,
            reset_after_secs: reset.as_secs() + u64::from(reset.subsec_nanos() > 0),
        }
    }

    fn evict_expired(&self, now: Instant) {
        self.state
            .retain(|_, (_, start)| now.duration_since(*start) < self.window);
    }

    /// Address the budget is charged to.
    ///
    /// Requests served without connection info (in-process test transports)
    /// all share the unspecified address.
    fn client_ip(&self, request: &Request) -> IpAddr {
        if self.trust_forwarded_for {
            if let Some(ip) = forwarded_for(request.headers()) {
                return ip;
            }
        }
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Middleware enforcing the limiter on every request it wraps.
pub async fn enforce(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = limiter.client_ip(&request);
    let status = limiter.check(client);

    let mut response = if status.is_limited {
        tracing::warn!(%client, limit = status.limit, "Rate limit exceeded");
        ApiError::RateLimited {
            retry_after_secs: status.reset_after_secs,
        }
        .into_response()
    } else {
        next.run(request).await
    };
    status.write_headers(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests,
            window_secs,
            trust_forwarded_for: false,
        })
    }

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

    #[test]
    fn test_limits_after_budget_is_spent() {
        let limiter = limiter(2, 60);
        let now = Instant::now();

        let first = limiter.check_at(CLIENT, now);
        assert!(!first.is_limited);
        assert_eq!(first.remaining, 1);

        let second = limiter.check_at(CLIENT, now);
        assert!(!second.is_limited);
        assert_eq!(second.remaining, 0);

        let third = limiter.check_at(CLIENT, now);
        assert!(third.is_limited);
        assert_eq!(third.remaining, 0);
        assert_eq!(third.reset_after_secs, 60);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        assert!(!limiter.check_at(CLIENT, start).is_limited);
        let later = limiter.check_at(CLIENT, start + Duration::from_secs(45));
        assert!(later.is_limited);
        assert_eq!(later.reset_after_secs, 15);

        assert!(
            !limiter
                .check_at(CLIENT, start + Duration::from_secs(60))
                .is_limited
        );
    }

    #[test]
    fn test_addresses_have_separate_budgets() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        let other = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1));

        assert!(!limiter.check_at(CLIENT, now).is_limited);
        assert!(limiter.check_at(CLIENT, now).is_limited);
        assert!(!limiter.check_at(other, now).is_limited);
    }

    #[test]
    fn test_eviction_drops_expired_windows_only() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        let other = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1));

        limiter.check_at(CLIENT, start);
        limiter.check_at(other, start + Duration::from_secs(30));
        limiter.evict_expired(start + Duration::from_secs(61));

        assert!(!limiter.state.contains_key(&CLIENT));
        assert!(limiter.state.contains_key(&other));
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(forwarded_for(&headers), Some(CLIENT));

        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        assert_eq!(forwarded_for(&headers), None);
    }

    #[test]
    fn test_limited_status_sets_retry_after() {
        let mut headers = HeaderMap::new();
        RateLimitStatus {
            is_limited: true,
            limit: 100,
            remaining: 0,
            reset_after_secs: 42,
        }
        .write_headers(&mut headers);

        assert_eq!(headers[X_RATE_LIMIT_LIMIT], "100");
        assert_eq!(headers[X_RATE_LIMIT_REMAINING], "0");
        assert_eq!(headers[header::RETRY_AFTER], "42");
    }
}
