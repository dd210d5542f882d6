//! In-memory venue that settles twins against a loaded order snapshot.

use std::collections::HashMap;
use std::fs;

use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Atomic, Market, Result, VenueError, Wallet};
use crate::domain::{Order, Token, deserialize_amount};

/// Token amount as written in a snapshot file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Amount(#[serde(deserialize_with = "deserialize_amount")] pub BigUint);

/// Snapshot of a venue: open orders, wallet balances and the flat cost
/// charged per settlement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub balances: HashMap<Token, Amount>,
    #[serde(default)]
    pub cost: Amount,
}

impl Snapshot {
    /// Parses a snapshot from YAML.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| VenueError::Snapshot(e.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
struct Ledger {
    orders: Vec<Order>,
    balances: HashMap<Token, BigUint>,
}

impl Ledger {
    fn balance(&self, token: &Token) -> BigUint {
        self.balances.get(token).cloned().unwrap_or_default()
    }

    /// Delivers `amount` of the order's buy token and collects its proceeds.
    fn settle(&mut self, order: &Order, amount: &BigUint) -> Result<()> {
        let idx = self
            .orders
            .iter()
            .position(|o| o.id == order.id)
            .ok_or(VenueError::OrderNotFound(order.id))?;

        let resting = &self.orders[idx];
        if amount > &resting.buy_amount {
            return Err(VenueError::Rejected(format!(
                "fill of {} exceeds order {} size {}",
                amount, resting.id, resting.buy_amount
            )));
        }
        let proceeds = resting.proceeds(amount);
        let gives = resting.buy_token.clone();
        let receives = resting.sell_token.clone();

        let available = self.balance(&gives);
        if &available < amount {
            return Err(VenueError::InsufficientFunds {
                token: gives,
                needed: amount.clone(),
                available,
            });
        }
        self.balances.insert(gives, available - amount);
        *self.balances.entry(receives).or_default() += &proceeds;

        let resting = &mut self.orders[idx];
        resting.buy_amount -= amount;
        resting.sell_amount -= &proceeds;
        if resting.buy_amount.is_zero() {
            self.orders.remove(idx);
        }
        Ok(())
    }
}

/// PaperVenue implements Market, Atomic and Wallet without touching a chain.
pub struct PaperVenue {
    ledger: Mutex<Ledger>,
    cost: BigUint,
}

impl PaperVenue {
    pub fn new(snapshot: Snapshot) -> Self {
        let balances = snapshot
            .balances
            .into_iter()
            .map(|(token, amount)| (token, amount.0))
            .collect();

        Self {
            ledger: Mutex::new(Ledger {
                orders: snapshot.orders,
                balances,
            }),
            cost: snapshot.cost.0,
        }
    }

    /// Loads a venue from a YAML snapshot file.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| VenueError::Snapshot(format!("{}: {}", path, e)))?;
        let snapshot = Snapshot::from_yaml(&content)?;

        info!(
            path = %path,
            orders = snapshot.orders.len(),
            tokens = snapshot.balances.len(),
            "Paper venue loaded"
        );

        Ok(Self::new(snapshot))
    }

    /// Number of orders still resting on the venue.
    pub async fn open_orders(&self) -> usize {
        self.ledger.lock().await.orders.len()
    }
}

#[async_trait]
impl Market for PaperVenue {
    async fn orders(&self) -> Result<Vec<Order>> {
        Ok(self.ledger.lock().await.orders.clone())
    }
}

#[async_trait]
impl Atomic for PaperVenue {
    async fn balance(&self, token: &Token) -> Result<BigUint> {
        Ok(self.ledger.lock().await.balance(token))
    }

    async fn execute_atomic(
        &self,
        first: &Order,
        first_amount: &BigUint,
        second: &Order,
        second_amount: &BigUint,
    ) -> Result<BigUint> {
        let mut ledger = self.ledger.lock().await;

        // Both legs go through a scratch ledger, committed only as a whole.
        let mut scratch = ledger.clone();
        scratch.settle(first, first_amount)?;
        scratch.settle(second, second_amount)?;
        *ledger = scratch;

        debug!(
            first = first.id,
            first_amount = %first_amount,
            second = second.id,
            second_amount = %second_amount,
            cost = %self.cost,
            "Paper twin settled"
        );

        Ok(self.cost.clone())
    }
}

#[async_trait]
impl Wallet for PaperVenue {
    async fn balance(&self, token: &Token) -> Result<BigUint> {
        Ok(self.ledger.lock().await.balance(token))
    }
}
