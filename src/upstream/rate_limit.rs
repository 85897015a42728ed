//! In-Memory Rate Limiter
//!
//! Fixed-window request counting keyed by caller. State is process-local:
//! counts are lost on restart and are not shared across instances.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per key per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// Process-local request-count limiter
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Stale keys are reclaimed once the map exceeds this size
const PRUNE_THRESHOLD: usize = 1024;

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `key`; returns false when the window quota is spent
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.config.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.config.max_requests {
            return false;
        }

        window.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_ms: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_millis(window_ms),
        })
    }

    #[test]
    fn test_allows_up_to_quota() {
        let limiter = limiter(3, 60_000);
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 60_000);
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 50);
        let start = Instant::now();
        assert!(limiter.check_at("a", start));
        assert!(!limiter.check_at("a", start));
        assert!(limiter.check_at("a", start + Duration::from_millis(50)));
    }
}
