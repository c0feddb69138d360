use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::rate_limit::MAX_WINDOW;

const MAX_WINDOW_SECS: u64 = MAX_WINDOW.as_secs();

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "persona-gateway")]
#[command(about = "Rate-limited persona chat proxy for the Anthropic Messages API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Base url of the messages API
    #[arg(short, long, env = "ANTHROPIC_BASE_URL", default_value = "https://api.anthropic.com")]
    pub upstream_url: String,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "ANTHROPIC_VERSION", default_value = "2023-06-01")]
    pub api_version: String,

    #[arg(short, long, env = "ANTHROPIC_MODEL", default_value = "claude-sonnet-4-20250514")]
    pub model: String,

    #[arg(long, env = "MAX_TOKENS", default_value_t = 1024)]
    pub max_tokens: u32,

    // Persona prompt file, see personas/example.txt
    #[arg(
        long,
        env = "PERSONA_FILE",
        help = "Persona prompt file. The built-in persona has no facts about anyone, so real deployments should set this"
    )]
    pub persona_file: Option<PathBuf>,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW_SECS))]
    pub rate_window: u64,

    // Seconds between sweeps of expired rate limit entries, 0 disables
    #[arg(long, env = "SWEEP_INTERVAL", default_value_t = 600)]
    pub sweep_interval: u64,

    // Upstream request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 60)]
    pub request_timeout: u64,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval > 0).then(|| Duration::from_secs(self.sweep_interval))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
