//! Engine configuration.

use std::time::Duration;

use super::EngineError;
use crate::arbitrage::{Orientation, SizingRule};
use crate::config::MatcherConfig;

/// Minimum margin used when none is configured.
pub const DEFAULT_THRESHOLD: u64 = 30000;

/// Interval between cycles used when none is configured.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60);

/// Engine configuration options. Fixed once the engine is built.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interval between two matching cycles.
    pub refresh: Duration,
    /// Minimum margin; settlements costing more are reported.
    pub threshold: u64,
    /// How trade sizes are derived from balances and order amounts.
    pub sizing: SizingRule,
    /// How book orientation is chosen.
    pub orientation: Orientation,
    /// Record twins without settling them.
    pub dry_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh: DEFAULT_REFRESH,
            threshold: DEFAULT_THRESHOLD,
            sizing: SizingRule::default(),
            orientation: Orientation::default(),
            dry_run: false,
        }
    }
}

impl EngineConfig {
    /// Builds the engine configuration from the `matcher` file section,
    /// falling back to defaults for anything left out.
    pub fn from_config(cfg: &MatcherConfig) -> Self {
        let defaults = Self::default();

        Self {
            refresh: Some(cfg.refresh)
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.refresh),
            threshold: cfg.threshold.unwrap_or(defaults.threshold),
            sizing: cfg.sizing.unwrap_or(defaults.sizing),
            orientation: cfg.orientation.unwrap_or(defaults.orientation),
            dry_run: cfg.dry_run,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.refresh.is_zero() {
            return Err(EngineError::Config("refresh interval must be positive".into()));
        }
        Ok(())
    }
}
