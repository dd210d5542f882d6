//! Matcher configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;
use crate::arbitrage::{Orientation, SizingRule};

/// Settings of the matching loop. Anything left out falls back to the
/// engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatcherConfig {
    /// Interval between cycles (e.g. "1m"). Zero or absent means default.
    #[serde(default, with = "duration")]
    pub refresh: Duration,
    /// Minimum acceptable margin, in the venue's cost unit.
    pub threshold: Option<u64>,
    /// Trade sizing rule: `widest` or `narrowest`.
    pub sizing: Option<SizingRule>,
    /// Book orientation: `first_seen` or `lexicographic`.
    pub orientation: Option<Orientation>,
    /// Log twins without settling them.
    #[serde(default)]
    pub dry_run: bool,
}
