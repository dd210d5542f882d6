//! Runtime statistics for the engine.

use chrono::{DateTime, Utc};

use super::report::CycleReport;

/// Runtime statistics for the engine.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub books: u64,
    pub abandoned_books: u64,
    pub rejected_orders: u64,
    pub twins: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
}
