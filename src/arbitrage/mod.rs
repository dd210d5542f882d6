//! Crossed-order detection and twin execution.
//!
//! Each book is drained best-first: the highest bid is paired with the
//! lowest ask until the pair no longer crosses, the book runs out, or the
//! book has to be abandoned.

mod books;
mod error;
mod sizing;

pub use books::{BookSet, Orientation, PairKey, build_books, fetch_books, ordered_pair};
pub use error::{CycleError, MatchError};
pub use sizing::{LegOrder, SizingRule, TradePlan, plan_trade};

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, error, info, warn};

use crate::domain::{Book, Order, Twin};
use crate::venue::Atomic;

/// How processing of a single book ended.
#[derive(Debug)]
pub enum BookOutcome {
    /// One side ran out of orders.
    Exhausted,
    /// The best remaining bid and ask do not cross.
    Uncrossed,
    /// The rest of the book was dropped.
    Abandoned(MatchError),
}

/// Result of matching all books of a cycle.
#[derive(Debug, Default)]
pub struct Outcome {
    pub twins: Vec<Twin>,
    pub books: usize,
    pub abandoned: usize,
}

/// Arbitrageur pairs crossed orders and settles them through `Atomic`.
pub struct Arbitrageur {
    atomic: Arc<dyn Atomic>,
    sizing: SizingRule,
    threshold: BigUint,
    dry_run: bool,
}

impl Arbitrageur {
    pub fn new(atomic: Arc<dyn Atomic>, sizing: SizingRule, threshold: u64, dry_run: bool) -> Self {
        Self {
            atomic,
            sizing,
            threshold: BigUint::from(threshold),
            dry_run,
        }
    }

    /// Matches every book independently and collects the resulting twins.
    pub async fn arbitrage(&self, books: Vec<Book>) -> Outcome {
        let mut outcome = Outcome::default();

        for mut book in books {
            outcome.books += 1;
            let (twins, result) = self.match_book(&mut book).await;
            let matched = twins.len();
            outcome.twins.extend(twins);

            match result {
                BookOutcome::Abandoned(e) => {
                    outcome.abandoned += 1;
                    if matches!(e, MatchError::ZeroTradable { .. }) {
                        warn!(book = %book, twins = matched, error = %e, "Book abandoned");
                    } else {
                        error!(book = %book, twins = matched, error = %e, "Book abandoned");
                    }
                }
                done => {
                    debug!(book = %book, twins = matched, outcome = ?done, "Book done");
                }
            }
        }

        outcome
    }

    /// Drains one book until its best bid and ask stop crossing.
    pub async fn match_book(&self, book: &mut Book) -> (Vec<Twin>, BookOutcome) {
        let mut twins = Vec::new();

        loop {
            let Ok(bid) = book.highest_bid() else {
                return (twins, BookOutcome::Exhausted);
            };
            let Ok(ask) = book.lowest_ask() else {
                return (twins, BookOutcome::Exhausted);
            };

            match self.match_pair(book, bid, ask).await {
                Ok(Some(twin)) => twins.push(twin),
                Ok(None) => return (twins, BookOutcome::Uncrossed),
                Err(e) => return (twins, BookOutcome::Abandoned(e)),
            }
        }
    }

    /// Returns None when the pair does not cross. Bids only get worse and
    /// asks only get dearer, so nothing later in the book crosses either.
    async fn match_pair(
        &self,
        book: &Book,
        bid: Order,
        ask: Order,
    ) -> Result<Option<Twin>, MatchError> {
        let (Some(bid_rate), Some(ask_rate)) = (bid.rate(), ask.inverse_rate()) else {
            return Ok(None);
        };
        if bid_rate <= ask_rate {
            debug!(bid = bid.id, ask = ask.id, bid_rate = %bid_rate, ask_rate = %ask_rate, "Orders do not cross");
            return Ok(None);
        }

        // base token is what the bid buys and the ask sells
        if bid.buy_token != ask.sell_token {
            return Err(MatchError::TokenMismatch {
                side: "base",
                book: book.to_string(),
                bid: bid.id,
                ask: ask.id,
            });
        }
        let base = bid.buy_token.clone();

        // quote token is what the bid sells and the ask buys
        if bid.sell_token != ask.buy_token {
            return Err(MatchError::TokenMismatch {
                side: "quote",
                book: book.to_string(),
                bid: bid.id,
                ask: ask.id,
            });
        }
        let quote = bid.sell_token.clone();

        let base_available = self
            .atomic
            .balance(&base)
            .await
            .map_err(|source| MatchError::BalanceUnavailable {
                token: base.clone(),
                source,
            })?;
        let quote_available = self
            .atomic
            .balance(&quote)
            .await
            .map_err(|source| MatchError::BalanceUnavailable {
                token: quote.clone(),
                source,
            })?;

        let plan = plan_trade(self.sizing, &bid, &ask, &base_available, &quote_available)?;

        debug!(
            bid = bid.id,
            ask = ask.id,
            bid_rate = %bid_rate,
            ask_rate = %ask_rate,
            base = %plan.base,
            quote = %plan.quote,
            quote_as_base = %plan.quote_as_base,
            order = ?plan.order,
            "Crossed orders sized"
        );

        let cost = if self.dry_run {
            BigUint::zero()
        } else {
            self.atomic
                .execute_atomic(
                    &plan.first.order,
                    &plan.first.amount,
                    &plan.second.order,
                    &plan.second.amount,
                )
                .await
                .map_err(MatchError::ExecutionFailed)?
        };

        if cost > self.threshold {
            warn!(
                cost = %cost,
                threshold = %self.threshold,
                "Settlement cost exceeds margin threshold"
            );
        }

        let twin = Twin::from_legs(plan.first, plan.second, cost);

        info!(
            base = %base,
            quote = %quote,
            first = %twin.first.token,
            first_change = %twin.first.amount,
            second = %twin.second.token,
            second_change = %twin.second.amount,
            cost = %twin.cost,
            dry_run = self.dry_run,
            "Twin executed"
        );

        Ok(Some(twin))
    }
}
