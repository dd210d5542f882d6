//! Arbitrage error types.

use num_bigint::BigUint;

use crate::domain::Token;
use crate::venue::VenueError;

/// Reasons a book is abandoned before it runs out of crossed orders.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("{side} token mismatch in book {book} (bid #{bid}, ask #{ask})")]
    TokenMismatch {
        side: &'static str,
        book: String,
        bid: u64,
        ask: u64,
    },
    #[error("could not get balance for {token}: {source}")]
    BalanceUnavailable { token: Token, source: VenueError },
    #[error("can't trade marginal amounts: {base} & {quote}")]
    ZeroTradable { base: BigUint, quote: BigUint },
    #[error("atomic execution failed: {0}")]
    ExecutionFailed(#[source] VenueError),
}

/// Errors that abandon a whole cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("could not retrieve orders from market: {0}")]
    MarketUnavailable(#[source] VenueError),
}
