//! Per-cycle aggregation of executed twins.

use std::collections::BTreeMap;

use num_bigint::{BigInt, BigUint};

use crate::domain::{Token, Twin};

/// Totals over all twins of one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub twins: usize,
    /// Sum of settlement costs.
    pub cost: BigUint,
    /// Net change per token, summed over both fills of every twin.
    pub changes: BTreeMap<Token, BigInt>,
}

impl CycleReport {
    pub fn from_twins(twins: &[Twin]) -> Self {
        let mut report = Self {
            twins: twins.len(),
            ..Self::default()
        };

        for twin in twins {
            report.cost += &twin.cost;
            for fill in [&twin.first, &twin.second] {
                *report.changes.entry(fill.token.clone()).or_default() += &fill.amount;
            }
        }

        report
    }
}
