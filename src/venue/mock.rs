//! Mock venue for matcher and engine tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use num_bigint::BigUint;

use super::{Atomic, Market, Result, VenueError, Wallet};
use crate::domain::{Order, Token};

/// Recorded `execute_atomic` call: (first id, first amount, second id, second amount).
pub(crate) type Execution = (u64, BigUint, u64, BigUint);

pub(crate) struct MockVenue {
    orders: Vec<Order>,
    balances: HashMap<Token, BigUint>,
    cost: BigUint,
    fail_orders: bool,
    fail_balance: bool,
    fail_execute: bool,
    delays: Mutex<VecDeque<Duration>>,
    pub orders_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub wallet_calls: AtomicUsize,
    pub executions: Mutex<Vec<Execution>>,
}

impl MockVenue {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
            balances: HashMap::new(),
            cost: BigUint::from(0u32),
            fail_orders: false,
            fail_balance: false,
            fail_execute: false,
            delays: Mutex::new(VecDeque::new()),
            orders_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            wallet_calls: AtomicUsize::new(0),
            executions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_balance(mut self, token: &str, amount: u64) -> Self {
        self.balances.insert(Token::new(token), BigUint::from(amount));
        self
    }

    pub fn with_cost(mut self, cost: u64) -> Self {
        self.cost = BigUint::from(cost);
        self
    }

    pub fn with_fail_orders(mut self) -> Self {
        self.fail_orders = true;
        self
    }

    pub fn with_fail_balance(mut self) -> Self {
        self.fail_balance = true;
        self
    }

    pub fn with_fail_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    /// Makes the next `orders` calls take the given durations, in turn.
    pub fn with_orders_delays(self, delays: &[Duration]) -> Self {
        self.delays
            .lock()
            .unwrap()
            .extend(delays.iter().copied());
        self
    }

    pub fn orders_calls(&self) -> usize {
        self.orders_calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn wallet_calls(&self) -> usize {
        self.wallet_calls.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> Vec<Execution> {
        self.executions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Market for MockVenue {
    async fn orders(&self) -> Result<Vec<Order>> {
        self.orders_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_orders {
            return Err(VenueError::Unavailable("mock market failure".into()));
        }
        Ok(self.orders.clone())
    }
}

#[async_trait]
impl Atomic for MockVenue {
    async fn balance(&self, token: &Token) -> Result<BigUint> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_balance {
            return Err(VenueError::Unavailable("mock balance failure".into()));
        }
        Ok(self.balances.get(token).cloned().unwrap_or_default())
    }

    async fn execute_atomic(
        &self,
        first: &Order,
        first_amount: &BigUint,
        second: &Order,
        second_amount: &BigUint,
    ) -> Result<BigUint> {
        if self.fail_execute {
            return Err(VenueError::Rejected("mock settlement failure".into()));
        }
        self.executions.lock().unwrap().push((
            first.id,
            first_amount.clone(),
            second.id,
            second_amount.clone(),
        ));
        Ok(self.cost.clone())
    }
}

#[async_trait]
impl Wallet for MockVenue {
    async fn balance(&self, token: &Token) -> Result<BigUint> {
        self.wallet_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balances.get(token).cloned().unwrap_or_default())
    }
}
