mod arbitrage;
mod config;
mod domain;
mod engine;
mod venue;

use config::Config;
use engine::{Engine, EngineConfig, EngineError};
use std::env;
use std::process;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use venue::{PaperVenue, VenueError};

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Process setup failures. Any of them ends the process with status 1.
#[derive(Debug, thiserror::Error)]
enum SetupError {
    #[error("venue.snapshot is required: no other venue binding is available")]
    NoSnapshot,
    #[error("failed to create venue: {0}")]
    Venue(#[from] VenueError),
    #[error("failed to create engine: {0}")]
    Engine(#[from] EngineError),
}

/// Builds the paper venue and the engine from a loaded config.
fn setup(config: &Config) -> Result<(Arc<PaperVenue>, Engine), SetupError> {
    let snapshot = config
        .venue
        .snapshot
        .as_deref()
        .ok_or(SetupError::NoSnapshot)?;
    let venue = Arc::new(PaperVenue::load(snapshot)?);

    let engine = Engine::new(
        EngineConfig::from_config(&config.matcher),
        venue.clone(),
        venue.clone(),
    )?;

    Ok((venue, engine))
}

#[tokio::main]
async fn main() {
    let config_path = parse_config_path();

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            process::exit(1);
        }
    };

    init_tracing(config.app.log_level.as_deref());

    info!(
        name = %config.app.name,
        env = %config.app.env,
        version = env!("CARGO_PKG_VERSION"),
        market = %config.venue.market,
        testnet = config.venue.testnet,
        "Starting matcher"
    );

    let (venue, engine) = match setup(&config) {
        Ok(built) => built,
        Err(e) => {
            error!(error = %e, "Setup failed");
            process::exit(1);
        }
    };

    if let Err(e) = engine.start().await {
        error!(error = %e, "Engine error");
        process::exit(1);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for shutdown signal");
    }

    if let Err(e) = engine.stop().await {
        error!(error = %e, "Engine did not stop cleanly");
        process::exit(1);
    }

    info!(open_orders = venue.open_orders().await, "Matcher exited");
}
