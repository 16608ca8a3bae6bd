//! Prompt dispatcher
//!
//! Single-binary service that:
//! 1. Loads API keys and prompts from line-oriented text files
//! 2. Rotates keys and model identifiers round-robin, one step per request
//! 3. POSTs each prompt to a chat-completion endpoint as a user message
//! 4. Paces dispatches with a randomized delay between iterations

mod client;
mod config;
mod runner;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::load_lines;
use rotation::{KeyRotator, ModelRotator};

use crate::client::Dispatcher;
use crate::config::Config;
use crate::runner::DispatchLoop;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting prompt-dispatcher");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let key_lines = load_lines(&config.sources.keys_file).with_context(|| {
        format!(
            "failed to load API keys from {}",
            config.sources.keys_file.display()
        )
    })?;
    let keys = KeyRotator::from_lines(key_lines).context("building key rotation")?;

    let prompts = load_lines(&config.sources.prompts_file).with_context(|| {
        format!(
            "failed to load prompts from {}",
            config.sources.prompts_file.display()
        )
    })?;

    let models = ModelRotator::new(config.api.models.clone()).context("building model rotation")?;

    info!(
        endpoint = %config.api.endpoint,
        keys = keys.len(),
        models = models.len(),
        prompts = prompts.len(),
        min_delay_secs = config.pacing.min_delay_secs,
        max_delay_secs = config.pacing.max_delay_secs,
        "configuration loaded"
    );

    let dispatcher = Dispatcher::new(reqwest::Client::new(), &config.api);
    let dispatch_loop = DispatchLoop::new(dispatcher, keys, models, prompts, &config.pacing)?;

    // The loop never returns; the process ends on an external signal.
    tokio::select! {
        _ = dispatch_loop.run() => {}
        _ = shutdown_signal() => {}
    }

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
