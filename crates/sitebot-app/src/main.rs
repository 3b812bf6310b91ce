//! SiteBot server entry point.
//!
//! Resolves configuration, initializes logging, builds the Gemini provider
//! and the response orchestrator, then serves the HTTP API.

mod cli;

use std::sync::Arc;

use clap::Parser;
use sitebot_api::{start_server, AppState};
use sitebot_chat::{GeminiProvider, HistoryWindow, ResponseOrchestrator};
use sitebot_core::config::{GeneralConfig, SitebotConfig};
use sitebot_core::SitebotError;

use crate::cli::CliArgs;

/// Outcome of reading the config file: `None` when there is no file.
type LoadedConfig = Result<Option<SitebotConfig>, SitebotError>;

/// Log level used when RUST_LOG is unset.
///
/// A config file that failed to load contributes nothing, so its error is
/// still reported at the default level.
fn startup_log_level(args: &CliArgs, loaded: &LoadedConfig) -> String {
    let config_level = match loaded {
        Ok(Some(config)) => config.general.log_level.clone(),
        _ => GeneralConfig::default().log_level,
    };
    args.resolve_log_level(&config_level)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing exists; its outcome is logged once tracing is up.
    let config_path = args.resolve_config_path();
    let loaded = if config_path.exists() {
        SitebotConfig::load(&config_path).map(Some)
    } else {
        Ok(None)
    };

    // Tracing. RUST_LOG wins over --log-level and the config file.
    let log_level = startup_log_level(&args, &loaded);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting SiteBot v{}", env!("CARGO_PKG_VERSION"));
    let mut config = match loaded {
        Ok(Some(config)) => {
            tracing::info!(path = %config_path.display(), "Configuration loaded");
            config
        }
        Ok(None) => {
            tracing::info!(path = %config_path.display(), "No configuration file, using defaults");
            SitebotConfig::default()
        }
        Err(e) => {
            tracing::error!(path = %config_path.display(), error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    // Overrides: env, then CLI.
    let file_api_key = config.provider.api_key.clone();
    config.apply_env_overrides(|var| std::env::var(var).ok());
    if let Some(key) = args.resolve_api_key() {
        config.provider.api_key = Some(key);
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    config.server.port = args.resolve_port(config.server.port);
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    if args.write_config {
        // Keys from the environment or the command line stay out of the file.
        let mut to_write = config.clone();
        to_write.provider.api_key = file_api_key;
        to_write.save(&config_path)?;
        tracing::info!(path = %config_path.display(), "Configuration written");
        return Ok(());
    }

    if !config.provider.has_credentials() {
        tracing::warn!(
            "No provider API key configured (set SITEBOT_API_KEY or GEMINI_API_KEY); \
             every reply will be the fallback message"
        );
    }

    // Provider and orchestrator.
    let provider = GeminiProvider::from_config(&config.provider)
        .map_err(|e| SitebotError::Provider(e.to_string()))?;
    let history_window = HistoryWindow::from_config(config.chat.history_window);
    let orchestrator = ResponseOrchestrator::new(Arc::new(provider)).with_history_window(history_window);
    tracing::info!(
        model = %config.provider.model,
        history_window = ?history_window,
        reply_timeout_secs = config.chat.reply_timeout_secs,
        "Response orchestrator ready"
    );

    // API server.
    let state = AppState::new(config.clone(), Arc::new(orchestrator));
    start_server(&config, state).await?;

    Ok(())
}
