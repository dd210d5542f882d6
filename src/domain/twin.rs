//! Matched order pairs settled as a single atomic operation.

use num_bigint::{BigInt, BigUint};

use super::order::{Order, Token};

/// Leg is one side of a twin: an order and the amount of its `buy_token`
/// delivered to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub order: Order,
    pub amount: BigUint,
}

impl Leg {
    pub fn new(order: Order, amount: BigUint) -> Self {
        Self { order, amount }
    }

    /// Token given away on this leg.
    pub fn gives(&self) -> &Token {
        &self.order.buy_token
    }

    /// Amount of the received token this leg yields.
    pub fn proceeds(&self) -> BigUint {
        self.order.proceeds(&self.amount)
    }
}

/// Fill is the net change of one token caused by a twin.
/// Positive amounts were received, negative amounts were spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub token: Token,
    pub amount: BigInt,
}

/// Twin is a pair of order fills executed as one atomic settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Twin {
    /// Net change of the token given away on the first leg.
    pub first: Fill,
    /// Net change of the token given away on the second leg.
    pub second: Fill,
    /// Settlement cost, e.g. the network fee.
    pub cost: BigUint,
    pub legs: (Leg, Leg),
}

impl Twin {
    /// Builds the twin for two legs where each leg receives what the other
    /// gives.
    pub fn from_legs(first: Leg, second: Leg, cost: BigUint) -> Self {
        let first_fill = Fill {
            token: first.gives().clone(),
            amount: BigInt::from(second.proceeds()) - BigInt::from(first.amount.clone()),
        };
        let second_fill = Fill {
            token: second.gives().clone(),
            amount: BigInt::from(first.proceeds()) - BigInt::from(second.amount.clone()),
        };
        Self {
            first: first_fill,
            second: second_fill,
            cost,
            legs: (first, second),
        }
    }
}
