use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::metrics::RATE_LIMIT_ENTRIES;

// Rate limit entry - tracks requests per IP/key
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: Instant,
}

// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
}

// longest window the limiter will track
pub const MAX_WINDOW: Duration = Duration::from_secs(60 * 60 * 24 * 365);

// fixed-window counter per client, bursts up to 2x max_requests across a reset
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    // quota is at least 1 and window at most MAX_WINDOW
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests: max_requests.max(1),
            window: window.min(MAX_WINDOW),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // shard lock held for the whole read-modify-write
    pub fn check(&self, identifier: &str, now: Instant) -> RateDecision {
        let fresh = RateLimitEntry {
            count: 1,
            window_reset_at: now.checked_add(self.window).unwrap_or(now),
        };

        let decision = match self.entries.entry(identifier.to_string()) {
            Entry::Occupied(mut entry) if now <= entry.get().window_reset_at => {
                let entry = entry.get_mut();
                // over limit
                if entry.count >= self.max_requests {
                    RateDecision {
                        allowed: false,
                        remaining: 0,
                    }
                } else {
                    entry.count += 1;
                    RateDecision {
                        allowed: true,
                        remaining: self.max_requests - entry.count,
                    }
                }
            }
            // window expired: replace, don't merge
            Entry::Occupied(mut entry) => {
                entry.insert(fresh);
                self.opened()
            }
            Entry::Vacant(entry) => {
                entry.insert(fresh);
                self.opened()
            }
        };

        RATE_LIMIT_ENTRIES.set(self.entries.len() as f64);
        decision
    }

    fn opened(&self) -> RateDecision {
        RateDecision {
            allowed: true,
            remaining: self.max_requests - 1,
        }
    }

    pub fn check_now(&self, identifier: &str) -> RateDecision {
        self.check(identifier, Instant::now())
    }

    // drop entries whose window expired before now
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.window_reset_at);
        let removed = before.saturating_sub(self.entries.len());

        RATE_LIMIT_ENTRIES.set(self.entries.len() as f64);
        removed
    }

    pub fn get(&self, identifier: &str) -> Option<RateLimitEntry> {
        self.entries.get(identifier).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Sweeper - drops expired windows so the map doesn't grow forever
pub async fn run_sweeper(rate_limiter: Arc<RateLimiter>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    tracing::info!(interval = ?sweep_interval, "rate limit sweeper started");

    loop {
        interval.tick().await;

        // tokio clock so paused test time applies
        let removed = rate_limiter.sweep(tokio::time::Instant::now().into_std());
        if removed > 0 {
            tracing::debug!(removed, remaining = rate_limiter.len(), "swept expired rate limit entries");
        }
    }
}
