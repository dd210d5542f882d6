//! Matcher engine.
//!
//! Owns the configuration and drives the periodic cycle: build books from
//! the market's orders, match them, then report balances and cost. A single
//! task runs the loop and handles one event at a time, so cycles never
//! overlap and `stop` only returns once no cycle is in flight.

mod config;
mod error;
mod report;
mod stats;

pub use config::{DEFAULT_REFRESH, DEFAULT_THRESHOLD, EngineConfig};
pub use error::EngineError;
pub use report::CycleReport;
pub use stats::Stats;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::arbitrage::{Arbitrageur, Orientation, fetch_books};
use crate::venue::{Atomic, Wallet};

/// Lifecycle states of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Running,
    Stopping,
}

struct Runner {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

struct Lifecycle {
    state: EngineState,
    runner: Option<Runner>,
    launched: bool,
    /// Flips to true once the run loop has exited.
    exited: watch::Sender<bool>,
}

/// Matcher engine that periodically looks for crossed orders.
pub struct Engine {
    cfg: EngineConfig,
    atomic: Arc<dyn Atomic>,
    wallet: Arc<dyn Wallet>,
    lifecycle: Mutex<Lifecycle>,
    stats: Arc<Mutex<Stats>>,
}

impl Engine {
    /// Creates a stopped engine.
    pub fn new(
        cfg: EngineConfig,
        atomic: Arc<dyn Atomic>,
        wallet: Arc<dyn Wallet>,
    ) -> Result<Self, EngineError> {
        cfg.validate()?;

        Ok(Self {
            cfg,
            atomic,
            wallet,
            lifecycle: Mutex::new(Lifecycle {
                state: EngineState::Stopped,
                runner: None,
                launched: false,
                exited: watch::Sender::new(false),
            }),
            stats: Arc::new(Mutex::new(Stats::default())),
        })
    }

    /// Launches the run loop. The first cycle runs one refresh interval
    /// after this call.
    pub async fn start(&self) -> Result<(), EngineError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match lifecycle.state {
            EngineState::Running | EngineState::Stopping => return Err(EngineError::AlreadyRunning),
            EngineState::Stopped if lifecycle.launched => return Err(EngineError::Terminated),
            EngineState::Stopped => {}
        }

        let mut ticker = time::interval_at(Instant::now() + self.cfg.refresh, self.cfg.refresh);
        // An overrunning cycle is followed by one catch-up tick; the rest are dropped.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run(self.cycle(), stop_rx, ticker));

        lifecycle.runner = Some(Runner {
            stop: stop_tx,
            handle,
        });
        lifecycle.state = EngineState::Running;
        lifecycle.launched = true;

        info!(
            refresh = ?self.cfg.refresh,
            threshold = self.cfg.threshold,
            sizing = ?self.cfg.sizing,
            orientation = ?self.cfg.orientation,
            dry_run = self.cfg.dry_run,
            "Matcher engine started"
        );

        Ok(())
    }

    /// Signals the run loop to quit and waits until it has exited.
    /// A cycle in progress completes first. Concurrent callers all wait
    /// for the same exit.
    pub async fn stop(&self) -> Result<(), EngineError> {
        let runner = {
            let mut lifecycle = self.lifecycle.lock().await;
            let state = lifecycle.state;
            match state {
                EngineState::Stopped => return Ok(()),
                EngineState::Stopping => {
                    let mut exited = lifecycle.exited.subscribe();
                    drop(lifecycle);
                    // The sender lives in `self`, so this only ends once the loop is gone.
                    let _ = exited.wait_for(|done| *done).await;
                    return Ok(());
                }
                EngineState::Running => {}
            }
            lifecycle.state = EngineState::Stopping;
            lifecycle.runner.take()
        };

        info!("Stopping matcher engine...");

        let joined = match runner {
            Some(runner) => {
                // The receiver is only gone if the loop already exited.
                let _ = runner.stop.send(());
                runner.handle.await
            }
            None => Ok(()),
        };

        {
            let mut lifecycle = self.lifecycle.lock().await;
            lifecycle.state = EngineState::Stopped;
            lifecycle.exited.send_replace(true);
        }
        joined?;

        let stats = self.stats().await;
        info!(cycles = stats.cycles, twins = stats.twins, "Matcher engine stopped");

        Ok(())
    }

    pub async fn state(&self) -> EngineState {
        self.lifecycle.lock().await.state
    }

    /// Returns true if the engine is currently running.
    pub async fn is_running(&self) -> bool {
        self.state().await == EngineState::Running
    }

    /// Returns a copy of the current statistics.
    pub async fn stats(&self) -> Stats {
        self.stats.lock().await.clone()
    }

    fn cycle(&self) -> Cycle {
        Cycle {
            arbitrageur: Arbitrageur::new(
                Arc::clone(&self.atomic),
                self.cfg.sizing,
                self.cfg.threshold,
                self.cfg.dry_run,
            ),
            atomic: Arc::clone(&self.atomic),
            wallet: Arc::clone(&self.wallet),
            orientation: self.cfg.orientation,
            stats: Arc::clone(&self.stats),
        }
    }
}

/// Everything one cycle needs, moved into the run loop task.
struct Cycle {
    arbitrageur: Arbitrageur,
    atomic: Arc<dyn Atomic>,
    wallet: Arc<dyn Wallet>,
    orientation: Orientation,
    stats: Arc<Mutex<Stats>>,
}

impl Cycle {
    /// Runs book building, matching and reporting once.
    async fn run(&self) {
        let set = match fetch_books(self.atomic.as_ref(), self.orientation).await {
            Ok(set) => set,
            Err(e) => {
                error!(error = %e, "Could not get orders");
                let mut stats = self.stats.lock().await;
                stats.cycles += 1;
                stats.failed_cycles += 1;
                stats.last_cycle_at = Some(Utc::now());
                return;
            }
        };
        let rejected = set.rejected;

        let outcome = self.arbitrageur.arbitrage(set.books).await;
        let report = CycleReport::from_twins(&outcome.twins);

        info!(twins = report.twins, cost = %report.cost, "Executed twins");

        for (token, change) in &report.changes {
            match self.wallet.balance(token).await {
                Ok(balance) => info!(token = %token, balance = %balance, change = %change, "Token balance"),
                Err(e) => warn!(token = %token, error = %e, "Could not get current balance"),
            }
        }

        info!(total_cost = %report.cost, books = outcome.books, "Cycle complete");

        let mut stats = self.stats.lock().await;
        stats.cycles += 1;
        stats.books += outcome.books as u64;
        stats.abandoned_books += outcome.abandoned as u64;
        stats.rejected_orders += rejected as u64;
        stats.twins += report.twins as u64;
        stats.last_cycle_at = Some(Utc::now());
        stats.last_report = Some(report);
    }
}

/// Run loop: waits for either the stop signal or the next tick and handles
/// exactly one of them before waiting again.
async fn run(cycle: Cycle, mut stop: oneshot::Receiver<()>, mut ticker: Interval) {
    loop {
        tokio::select! {
            biased;

            _ = &mut stop => break,
            _ = ticker.tick() => cycle.run().await,
        }
    }

    debug!("Run loop exited");
}

#[cfg(test)]
mod tests;
