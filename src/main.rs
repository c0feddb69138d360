use anyhow::Context;
use clap::Parser; // for cli
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use persona_gateway::config::Args;
use persona_gateway::rate_limit::{RateLimiter, run_sweeper};
use persona_gateway::{AppState, UpstreamClient, persona, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // parse cli arguments
    let args = Args::parse();

    let persona = persona::load(args.persona_file.as_deref())?;

    let client = reqwest::Client::builder()
        .timeout(args.request_timeout())
        .build()
        .context("failed to build http client")?;

    let upstream = UpstreamClient::new(
        client,
        &args.upstream_url,
        args.api_key.clone(),
        args.api_version.clone(),
        args.model.clone(),
        args.max_tokens,
        persona,
    );

    let rate_limiter = Arc::new(RateLimiter::new(args.rate_limit, args.rate_window()));

    // spawn the background sweeper
    if let Some(sweep_interval) = args.sweep_interval() {
        let sweeper_limiter = Arc::clone(&rate_limiter);
        tokio::spawn(async move {
            run_sweeper(sweeper_limiter, sweep_interval).await;
        });
    }

    tracing::info!(
        "Rate limit: {} requests per {:?}",
        rate_limiter.max_requests(),
        rate_limiter.window()
    );

    let state = Arc::new(AppState::new(upstream, rate_limiter));
    let app = router::build(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Gateway running on http://localhost:{}", args.port);
    tracing::info!(upstream = %args.upstream_url, model = %args.model, "forwarding chat messages");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
