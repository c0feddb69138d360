pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod persona;
pub mod rate_limit;
pub mod router;
pub mod state;
pub mod upstream;

pub use error::{GatewayError, Result};
pub use rate_limit::{RateDecision, RateLimiter};
pub use state::AppState;
pub use upstream::UpstreamClient;
