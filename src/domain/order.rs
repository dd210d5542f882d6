//! Core business entities for standing offers on the venue.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::amount;

/// Token is an opaque token identifier, usually a hex contract address.
///
/// Identifiers are normalized to lowercase so that checksummed and plain
/// spellings of the same address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub struct Token(String);

impl Token {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }
}

impl From<String> for Token {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for Token {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rate is an exact exchange rate held as a fraction of two amounts.
///
/// Comparison is done by cross-multiplication, so `1/2 == 2/4` and no
/// precision is lost for large token amounts.
#[derive(Debug, Clone)]
pub struct Rate {
    num: BigUint,
    den: BigUint,
}

impl Rate {
    /// Returns None when the denominator is zero.
    pub fn new(num: BigUint, den: BigUint) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        Some(Self { num, den })
    }

    /// Approximates the rate as a decimal for display purposes.
    ///
    /// Returns None if either side does not fit into a Decimal.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let num = Decimal::from_str(&self.num.to_string()).ok()?;
        let den = Decimal::from_str(&self.den.to_string()).ok()?;
        num.checked_div(den)
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rate {}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(rate) => write!(f, "{}", rate.round_dp(8).normalize()),
            None => write!(f, "{}/{}", self.num, self.den),
        }
    }
}

/// Reasons an order is refused at ingestion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order {0} has a zero buy amount")]
    ZeroBuyAmount(u64),
    #[error("order {0} has a zero sell amount")]
    ZeroSellAmount(u64),
    #[error("order {0} buys and sells the same token")]
    SameToken(u64),
}

/// Order is a standing offer to give `sell_amount` of `sell_token` in
/// exchange for `buy_amount` of `buy_token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    /// Venue-assigned offer identifier.
    pub id: u64,
    /// Token the order wants to receive.
    pub buy_token: Token,
    /// Amount of `buy_token` the order wants to receive.
    #[serde(deserialize_with = "amount::deserialize")]
    pub buy_amount: BigUint,
    /// Token the order gives away.
    pub sell_token: Token,
    /// Amount of `sell_token` the order gives away.
    #[serde(deserialize_with = "amount::deserialize")]
    pub sell_amount: BigUint,
}

impl Order {
    pub fn new(
        id: u64,
        buy_token: impl Into<Token>,
        buy_amount: impl Into<BigUint>,
        sell_token: impl Into<Token>,
        sell_amount: impl Into<BigUint>,
    ) -> Self {
        Self {
            id,
            buy_token: buy_token.into(),
            buy_amount: buy_amount.into(),
            sell_token: sell_token.into(),
            sell_amount: sell_amount.into(),
        }
    }

    /// Checks that the order can be priced from either side of a book.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.buy_amount.is_zero() {
            return Err(OrderError::ZeroBuyAmount(self.id));
        }
        if self.sell_amount.is_zero() {
            return Err(OrderError::ZeroSellAmount(self.id));
        }
        if self.buy_token == self.sell_token {
            return Err(OrderError::SameToken(self.id));
        }
        Ok(())
    }

    /// The rate the order accepts: `sell_amount / buy_amount`.
    pub fn rate(&self) -> Option<Rate> {
        Rate::new(self.sell_amount.clone(), self.buy_amount.clone())
    }

    /// The inverse rate: `buy_amount / sell_amount`.
    pub fn inverse_rate(&self) -> Option<Rate> {
        Rate::new(self.buy_amount.clone(), self.sell_amount.clone())
    }

    /// Amount of `sell_token` received for delivering `delivered` of
    /// `buy_token` to this order, truncated.
    pub fn proceeds(&self, delivered: &BigUint) -> BigUint {
        if self.buy_amount.is_zero() {
            return BigUint::zero();
        }
        delivered * &self.sell_amount / &self.buy_amount
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} buy {} {} for {} {}",
            self.id, self.buy_amount, self.buy_token, self.sell_amount, self.sell_token
        )
    }
}
