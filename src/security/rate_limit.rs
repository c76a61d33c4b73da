//! Fixed-window rate limiting keyed by client identity.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::error::GatewayError;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    window_start: Instant,
    count: u32,
}

/// Process-wide counter store. One bucket per client key, created on first
/// request and reset when its window expires.
///
/// Check-and-increment is atomic per key: the DashMap entry guard holds the
/// shard lock for the whole read-check-increment, so concurrent racers at
/// the limit boundary cannot all be admitted.
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            limit,
            window,
        }
    }

    /// Admit or reject one request from `key`.
    pub fn check(&self, key: &str) -> Result<(), GatewayError> {
        self.check_at(key, Instant::now())
    }

    /// Clock-injected variant so window semantics are testable without
    /// sleeping.
    pub fn check_at(&self, key: &str, now: Instant) -> Result<(), GatewayError> {
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            window_start: now,
            count: 0,
        });

        if now.duration_since(bucket.window_start) >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }

        bucket.count = bucket.count.saturating_add(1);

        if bucket.count <= self.limit {
            Ok(())
        } else {
            let elapsed = now.duration_since(bucket.window_start);
            let retry_after_secs = self.window.saturating_sub(elapsed).as_secs().max(1);
            Err(GatewayError::RateLimitExceeded { retry_after_secs })
        }
    }

    /// Evict buckets idle for at least two full windows. Returns the number
    /// of buckets removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let horizon = self.window * 2;
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.window_start) < horizon);
        before - self.buckets.len()
    }

    /// Background eviction loop; terminates on the shutdown signal.
    pub fn spawn_sweeper(self: &Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.window);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = limiter.sweep(Instant::now());
                        if evicted > 0 {
                            tracing::debug!(evicted, "swept stale rate-limit buckets");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
        });
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
