//! Tracing, configuration and service wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sitepilot_api::{ApiConfig, ApiServer, AppState};
use sitepilot_config::{Config, ConfigError, ConfigLoader, ConfigValidator};
use sitepilot_desktop::{DesktopBackend, SystemBackend};
use sitepilot_provider_anthropic::AnthropicProvider;
use sitepilot_runtime::{EndpointStore, SessionManager};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The ~/.sitepilot directory.
pub(crate) fn sitepilot_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".sitepilot"))
        .unwrap_or_else(|| PathBuf::from(".sitepilot"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.sitepilot/logs/ with daily rotation.
pub(crate) fn init_tracing() -> Result<(), BoxError> {
    let log_dir = sitepilot_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("sitepilot")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Load the config file (or defaults), apply environment overrides and
/// validate. Warnings are logged; any error aborts.
pub(crate) fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = ConfigLoader::load_or_default(path)?;
    let result = ConfigValidator::validate(&config)?;

    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if let Some(first) = result.errors.first() {
        for e in &result.errors {
            error!("Config {}: {}", e.path, e.message);
        }
        return Err(first.into());
    }

    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Build the session manager over the real desktop. Fails fast without an
/// API key.
pub(crate) fn build_sessions(config: Config) -> Result<Arc<SessionManager>, BoxError> {
    let provider = AnthropicProvider::from_config(&config.provider)?;

    let cache_dir = PathBuf::from(ConfigLoader::expand_path(
        &config.endpoints.cache_dir.to_string_lossy(),
    ));
    let store = EndpointStore::open(cache_dir.clone(), &config.endpoints.always_registered)?;
    info!(
        "Endpoint cache at {} ({} registered)",
        cache_dir.display(),
        store.slugs().len()
    );

    let backend: Arc<dyn DesktopBackend> = Arc::new(SystemBackend::new());
    Ok(Arc::new(SessionManager::new(
        Arc::new(config),
        Arc::new(provider),
        backend,
        Arc::new(store),
    )))
}

/// Run the HTTP API in the foreground.
pub(crate) async fn run_server(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), BoxError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let api_config = ApiConfig::from(&config.server);

    info!("Starting SitePilot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Display {}x{}, agent model {}",
        config.display.width, config.display.height, config.provider.agent_model
    );
    if !config.shortcuts.is_empty() {
        let names: Vec<&str> = config.shortcuts.iter().map(|s| s.name.as_str()).collect();
        info!("Shortcuts: {}", names.join(", "));
    }

    let sessions = build_sessions(config)?;
    let server = ApiServer::new(api_config, Arc::new(AppState::new(sessions)));

    info!("SitePilot ready at http://{}", server.addr());
    info!("  POST /navigate          - open a website");
    info!("  POST /create-endpoint   - scrape a page into /{{slug}}");
    info!("  GET  /generate-docs     - docs as server-sent events");
    server.run().await?;

    info!("Shutting down...");
    Ok(())
}
