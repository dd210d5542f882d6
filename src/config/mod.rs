//! Configuration loading and validation for the matcher.
//!
//! Uses serde_yaml to load YAML configuration files, with an environment
//! override for the market address.

mod app;
mod duration;
mod error;
mod matcher;
mod venue;

pub use app::AppConfig;
pub use error::ConfigError;
pub use matcher::MatcherConfig;
pub use venue::VenueConfig;

use serde::Deserialize;
use std::{env, fs};

/// Environment variable overriding `venue.market`.
pub const MARKET_ENV: &str = "M3_MARKET";

/// Root configuration structure.
///
/// Required sections: app, venue. Optional section: matcher.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Matching loop settings.
    #[serde(default)]
    pub matcher: MatcherConfig,
    /// Venue address and snapshot.
    pub venue: VenueConfig,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Loads `.env` first (if present) so `M3_MARKET` can come from there.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.load_overrides_from_env();
        config.validate()?;

        Ok(config)
    }

    fn load_overrides_from_env(&mut self) {
        if let Ok(market) = env::var(MARKET_ENV) {
            if !market.is_empty() {
                self.venue.market = market;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        if self.venue.market.is_empty() {
            return Err(ConfigError::Validation(format!(
                "venue.market is required (or set {})",
                MARKET_ENV
            )));
        }
        self.venue
            .validate_market()
            .map_err(ConfigError::Validation)?;

        Ok(())
    }
}
