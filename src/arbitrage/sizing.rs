//! Trade sizing for a crossed bid/ask pair.

use std::cmp;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::Deserialize;

use super::MatchError;
use crate::domain::{Leg, Order};

/// How the three candidate amounts of each side are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingRule {
    /// Greatest of balance, bid amount and ask amount.
    #[default]
    Widest,
    /// Smallest of balance, bid amount and ask amount. The second leg is
    /// also capped at what its order still buys; any surplus of the first
    /// leg's proceeds stays in the wallet.
    Narrowest,
}

impl SizingRule {
    pub fn pick<'a>(&self, x: &'a BigUint, y: &'a BigUint, z: &'a BigUint) -> &'a BigUint {
        match self {
            SizingRule::Widest => cmp::max(x, cmp::max(y, z)),
            SizingRule::Narrowest => cmp::min(x, cmp::min(y, z)),
        }
    }

    /// Caps a second-leg delivery at the amount its order buys.
    fn cap(&self, amount: BigUint, wanted: &BigUint) -> BigUint {
        match self {
            SizingRule::Widest => amount,
            SizingRule::Narrowest => cmp::min(amount, wanted.clone()),
        }
    }
}

/// Which leg is settled first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegOrder {
    /// Sell base to the bid, then spend the quote proceeds on the ask.
    BaseFirst,
    /// Sell quote to the ask, then spend the base proceeds on the bid.
    QuoteFirst,
}

/// Sized legs for one twin.
#[derive(Debug, Clone)]
pub struct TradePlan {
    pub order: LegOrder,
    pub first: Leg,
    pub second: Leg,
    /// Base-side candidate amount.
    pub base: BigUint,
    /// Quote-side candidate amount.
    pub quote: BigUint,
    /// Quote-side candidate converted to base at the ask's rate.
    pub quote_as_base: BigUint,
}

/// Sizes a twin for `bid` and `ask` given the available balances.
///
/// The side with the larger base-equivalent amount is settled first.
pub fn plan_trade(
    rule: SizingRule,
    bid: &Order,
    ask: &Order,
    base_available: &BigUint,
    quote_available: &BigUint,
) -> Result<TradePlan, MatchError> {
    let base = rule
        .pick(base_available, &bid.buy_amount, &ask.sell_amount)
        .clone();
    let quote = rule
        .pick(quote_available, &bid.sell_amount, &ask.buy_amount)
        .clone();

    // quote * ask.sell_amount / ask.buy_amount
    let quote_as_base = ask.proceeds(&quote);

    if base.is_zero() && quote_as_base.is_zero() {
        return Err(MatchError::ZeroTradable { base, quote });
    }

    let (order, first, second) = if base > quote_as_base {
        let first = Leg::new(bid.clone(), base.clone());
        let second = Leg::new(ask.clone(), rule.cap(first.proceeds(), &ask.buy_amount));
        (LegOrder::BaseFirst, first, second)
    } else {
        let first = Leg::new(ask.clone(), quote.clone());
        let second = Leg::new(bid.clone(), rule.cap(quote_as_base.clone(), &bid.buy_amount));
        (LegOrder::QuoteFirst, first, second)
    };

    if rule == SizingRule::Narrowest && second.amount.is_zero() {
        return Err(MatchError::ZeroTradable { base, quote });
    }

    Ok(TradePlan {
        order,
        first,
        second,
        base,
        quote,
        quote_as_base,
    })
}
