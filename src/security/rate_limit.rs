//! Global request rate limiting.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Mutex;
use std::time::Instant;

use crate::AppState;

/// Token-bucket rate limiter.
///
/// A single global bucket: tokens accrue at `rate_per_sec` up to
/// `burst_size`, and each request consumes one. Not keyed by IP (that would
/// require `ConnectInfo`); the goal is to bound total request throughput.
#[derive(Debug)]
pub struct SimpleRateLimiter {
    // (last_update, tokens)
    state: Mutex<(Instant, f32)>,
    rate_per_sec: f32,
    burst_size: f32,
}

impl SimpleRateLimiter {
    #[must_use]
    pub fn new(rate_per_sec: f32, burst_size: f32) -> Self {
        Self {
            state: Mutex::new((Instant::now(), burst_size)),
            rate_per_sec,
            burst_size,
        }
    }

    /// Try to consume one token. Returns false when the bucket is empty.
    pub fn check(&self) -> bool {
        let mut guard = self.state.lock().unwrap();
        let (last_update, tokens) = *guard;
        let now = Instant::now();
        let elapsed = now.duration_since(last_update).as_secs_f32();

        let mut new_tokens = tokens + (elapsed * self.rate_per_sec);
        if new_tokens > self.burst_size {
            new_tokens = self.burst_size;
        }

        if new_tokens >= 1.0 {
            *guard = (now, new_tokens - 1.0);
            true
        } else {
            // State must reflect time passage even on a denied request.
            *guard = (now, new_tokens);
            false
        }
    }
}

/// Middleware to enforce rate limits.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if state.config.resilience.rate_limit_enabled && !state.rate_limiter.check() {
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_simple_rate_limiter() {
        let limiter = SimpleRateLimiter::new(2.0, 3.0); // 2 req/s, 3 burst

        // Consume all burst
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(limiter.check());

        // Next should fail (immediate)
        assert!(!limiter.check());

        // Wait for 0.6s -> +1.2 tokens -> one more request succeeds
        std::thread::sleep(Duration::from_millis(600));
        assert!(limiter.check());

        // Immediate fail
        assert!(!limiter.check());
    }
}
