//! Postboard server binary.
//!
//! Wires the configuration, the file-backed post store, and the HTTP API
//! together, then serves requests until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `postboard.yaml` (or `POSTBOARD_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the post store from the configured data file
//! 4. Seed the starter posts if enabled and the store is empty
//! 5. Serve the API until a shutdown signal arrives

mod config;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use postboard_api::AppState;
use postboard_store::{FilePersistence, PostStore, default_seed_posts};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig, PostboardConfig};
use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "postboard.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be
/// initialized, seeding fails, or the listener cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = config_path(|key| std::env::var(key).ok());
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;

    info!("postboard-server starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Open the store.
    let store = PostStore::open(FilePersistence::new(&config.storage.data_file))
        .await
        .with_default_page_limit(config.query.default_page_limit);
    info!(
        data_file = %config.storage.data_file.display(),
        posts = store.len().await,
        default_page_limit = store.default_page_limit(),
        "Post store opened"
    );

    // 4. Seed starter posts.
    if config.storage.seed_defaults {
        let seeded = store
            .seed_if_empty(default_seed_posts())
            .await
            .map_err(AppError::from)?;
        if seeded > 0 {
            info!(seeded, "Starter posts seeded");
        }
    }

    // 5. Serve until Ctrl-C.
    let state = Arc::new(AppState::new(store));
    postboard_api::start_server(&config.server_config(), state, shutdown_signal())
        .await
        .map_err(AppError::from)?;

    info!("postboard-server stopped");
    Ok(())
}

/// Resolve the configuration file path from `POSTBOARD_CONFIG`, falling
/// back to [`DEFAULT_CONFIG_PATH`].
fn config_path(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup("POSTBOARD_CONFIG")
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load configuration from `path`, or defaults if the file does not exist.
///
/// The boolean reports whether the file was found.
fn load_config(path: &std::path::Path) -> Result<(PostboardConfig, bool), AppError> {
    if path.exists() {
        Ok((PostboardConfig::from_file(path)?, true))
    } else {
        Ok((PostboardConfig::from_env()?, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| AppError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match logging.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}

/// Resolve when the process receives Ctrl-C.
///
/// If the signal handler cannot be installed the error is logged and the
/// future resolves immediately, which stops the server.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "failed to listen for Ctrl-C, shutting down"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn config_path_defaults_to_local_file() {
        assert_eq!(config_path(|_| None), PathBuf::from("postboard.yaml"));
    }

    #[test]
    fn config_path_honors_env() {
        let path = config_path(|key| {
            (key == "POSTBOARD_CONFIG").then(|| String::from("/etc/postboard.yaml"))
        });
        assert_eq!(path, PathBuf::from("/etc/postboard.yaml"));
    }

    #[test]
    fn blank_config_env_falls_back() {
        let path = config_path(|_| Some(String::from("  ")));
        assert_eq!(path, PathBuf::from("postboard.yaml"));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let (config, from_file) =
            load_config(std::path::Path::new("/nonexistent/postboard.yaml")).unwrap();
        assert!(!from_file);
        assert!(config.query.default_page_limit >= 1);
    }
}
