use std::sync::Arc;

use crate::rate_limit::RateLimiter;
use crate::upstream::UpstreamClient;

// app's shared state

pub struct AppState {
    pub upstream: UpstreamClient,
    pub rate_limiter: Arc<RateLimiter>, // shared with the sweeper task
}

impl AppState {
    pub fn new(upstream: UpstreamClient, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            upstream,
            rate_limiter,
        }
    }
}
