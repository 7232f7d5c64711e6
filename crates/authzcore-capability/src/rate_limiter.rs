//! Token-bucket admission control, keyed per session, tenant, or any other
//! caller-chosen string.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Default maximum number of distinct buckets a `SessionRateLimiter` keeps
/// before evicting the least-recently-used one.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub burst_size: f64,
    pub requests_per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst_size: 10.0,
            requests_per_second: 5.0,
        }
    }
}

/// A single token bucket. `allow()` refills by elapsed-time * rate (capped
/// at capacity), then admits if at least one token is available.
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        Self {
            tokens: config.burst_size,
            capacity: config.burst_size,
            refill_rate: config.requests_per_second,
            last_update: Instant::now(),
        }
    }

    fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

struct BucketEntry {
    bucket: TokenBucket,
    last_used: u64,
}

#[derive(Debug, Serialize)]
pub struct RateLimiterStats {
    pub active_sessions: usize,
    pub max_sessions: usize,
    pub config: RateLimitConfig,
    pub total_allows: u64,
    pub total_denies: u64,
}

/// A bounded LRU collection of per-key token buckets. Safe to share behind
/// an `Arc` across threads; bucket state is updated atomically under a
/// single mutex (contention is bounded to whichever key is currently being
/// admitted).
pub struct SessionRateLimiter {
    config: RateLimitConfig,
    max_sessions: usize,
    buckets: Mutex<HashMap<String, BucketEntry>>,
    clock: AtomicU64,
    total_allows: AtomicU64,
    total_denies: AtomicU64,
}

impl SessionRateLimiter {
    pub fn new(config: RateLimitConfig, max_sessions: usize) -> Self {
        Self {
            config,
            max_sessions: max_sessions.max(1),
            buckets: Mutex::new(HashMap::new()),
            clock: AtomicU64::new(0),
            total_allows: AtomicU64::new(0),
            total_denies: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default(), DEFAULT_MAX_SESSIONS)
    }

    pub fn allow(&self, key: &str) -> bool {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");

        if !buckets.contains_key(key) && buckets.len() >= self.max_sessions {
            if let Some(lru_key) = buckets
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone())
            {
                buckets.remove(&lru_key);
            }
        }

        let entry = buckets.entry(key.to_string()).or_insert_with(|| BucketEntry {
            bucket: TokenBucket::new(&self.config),
            last_used: tick,
        });
        entry.last_used = tick;
        let allowed = entry.bucket.allow();

        if allowed {
            self.total_allows.fetch_add(1, Ordering::Relaxed);
        } else {
            self.total_denies.fetch_add(1, Ordering::Relaxed);
        }
        allowed
    }

    pub fn get_stats(&self) -> RateLimiterStats {
        let buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        RateLimiterStats {
            active_sessions: buckets.len(),
            max_sessions: self.max_sessions,
            config: self.config.clone(),
            total_allows: self.total_allows.load(Ordering::Relaxed),
            total_denies: self.total_denies.load(Ordering::Relaxed),
        }
    }
}
