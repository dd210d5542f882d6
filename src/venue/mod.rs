//! Venue collaborator abstractions and implementations.
//!
//! The matcher only talks to a venue through these traits; the concrete
//! binding (e.g. an on-chain contract over a node connection) lives behind them.

mod paper;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use num_bigint::BigUint;
use thiserror::Error;

use crate::domain::{Order, Token};

pub use paper::{PaperVenue, Snapshot};

/// Venue errors.
#[derive(Debug, Error)]
pub enum VenueError {
    /// The venue could not be reached or returned garbage.
    #[error("venue unavailable: {0}")]
    Unavailable(String),

    /// Not enough of a token to deliver a leg.
    #[error("insufficient funds: need {needed} {token}, have {available}")]
    InsufficientFunds {
        token: Token,
        needed: BigUint,
        available: BigUint,
    },

    /// Order does not exist or is already filled.
    #[error("order {0} not found")]
    OrderNotFound(u64),

    /// Settlement was refused by the venue.
    #[error("settlement rejected: {0}")]
    Rejected(String),

    /// Snapshot could not be loaded.
    #[error("failed to load snapshot: {0}")]
    Snapshot(String),
}

/// Result type for venue operations.
pub type Result<T> = std::result::Result<T, VenueError>;

/// Market is the source of standing orders.
#[async_trait]
pub trait Market: Send + Sync {
    /// Returns all currently open orders on the venue.
    async fn orders(&self) -> Result<Vec<Order>>;
}

/// Atomic trades against the market it extends, settling pairs of orders
/// as one indivisible operation.
#[async_trait]
pub trait Atomic: Market {
    /// Returns the balance of `token` available for trading.
    async fn balance(&self, token: &Token) -> Result<BigUint>;

    /// Delivers `first_amount` of `first.buy_token` to `first` and
    /// `second_amount` of `second.buy_token` to `second`.
    /// Either both legs settle or neither does. Returns the settlement cost.
    async fn execute_atomic(
        &self,
        first: &Order,
        first_amount: &BigUint,
        second: &Order,
        second_amount: &BigUint,
    ) -> Result<BigUint>;
}

/// Wallet reports balances after a cycle.
///
/// Kept apart from `Atomic::balance` so reporting may use a different
/// source than sizing.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn balance(&self, token: &Token) -> Result<BigUint>;
}
