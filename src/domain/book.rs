//! Per-pair order book with best-first extraction.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

use super::order::{Order, Rate, Token};

/// Book errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    /// No order left on the requested side.
    #[error("book is empty")]
    EmptyBook,
    /// The order cannot be priced on the requested side.
    #[error("order {0} cannot be priced in this book")]
    InvalidOrder(u64),
}

/// Heap entry ranked by `key`, ties resolved by insertion order.
#[derive(Debug)]
struct Entry<K> {
    key: K,
    seq: u64,
    order: Order,
}

impl<K: Ord> Ord for Entry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower sequence numbers rank higher so equal keys pop in insertion order.
        self.key
            .cmp(&other.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<K: Ord> PartialOrd for Entry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Entry<K> {}

/// Book holds the bids and asks of one token pair.
///
/// Bids buy `base` and sell `quote`; asks sell `base` and buy `quote`. Both
/// sides are ranked in quote-per-base: a bid by its own rate, an ask by the
/// inverse of its rate.
#[derive(Debug)]
pub struct Book {
    pub base: Token,
    pub quote: Token,
    bids: BinaryHeap<Entry<Rate>>,
    asks: BinaryHeap<Entry<Reverse<Rate>>>,
    seq: u64,
}

impl Book {
    pub fn new(base: Token, quote: Token) -> Self {
        Self {
            base,
            quote,
            bids: BinaryHeap::new(),
            asks: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Adds an order offering quote for base.
    pub fn add_bid(&mut self, order: Order) -> Result<(), BookError> {
        let key = order.rate().ok_or(BookError::InvalidOrder(order.id))?;
        let seq = self.next_seq();
        self.bids.push(Entry { key, seq, order });
        Ok(())
    }

    /// Adds an order offering base for quote.
    pub fn add_ask(&mut self, order: Order) -> Result<(), BookError> {
        let price = order
            .inverse_rate()
            .ok_or(BookError::InvalidOrder(order.id))?;
        let seq = self.next_seq();
        self.asks.push(Entry {
            key: Reverse(price),
            seq,
            order,
        });
        Ok(())
    }

    /// Removes and returns the bid with the highest rate.
    pub fn highest_bid(&mut self) -> Result<Order, BookError> {
        self.bids
            .pop()
            .map(|entry| entry.order)
            .ok_or(BookError::EmptyBook)
    }

    /// Removes and returns the ask with the lowest rate.
    pub fn lowest_ask(&mut self) -> Result<Order, BookError> {
        self.asks
            .pop()
            .map(|entry| entry.order)
            .ok_or(BookError::EmptyBook)
    }

    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_count(&self) -> usize {
        self.asks.len()
    }

    pub fn len(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({} bids, {} asks)",
            self.base,
            self.quote,
            self.bids.len(),
            self.asks.len()
        )
    }
}
