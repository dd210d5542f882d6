//! Groups a flat list of orders into per-pair books.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use super::CycleError;
use crate::domain::{Book, BookError, Order, Token};
use crate::venue::Market;

/// Orientation decides which token of a pair becomes the base of its book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// The buy token of the first order seen for a pair is the base.
    /// Orientation may flip between cycles as order listings change.
    #[default]
    FirstSeen,
    /// The lexicographically smaller token is the base, stable across cycles.
    Lexicographic,
}

/// Directional key of a token pair: `(a, b)` and `(b, a)` differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(Token, Token);

pub fn ordered_pair(first: &Token, second: &Token) -> PairKey {
    PairKey(first.clone(), second.clone())
}

/// Books produced for one cycle.
#[derive(Debug, Default)]
pub struct BookSet {
    /// Books in no particular order.
    pub books: Vec<Book>,
    /// Orders refused at ingestion.
    pub rejected: usize,
}

/// Retrieves all open orders from `market` and builds books from them.
pub async fn fetch_books<M>(market: &M, orientation: Orientation) -> Result<BookSet, CycleError>
where
    M: Market + ?Sized,
{
    let orders = market
        .orders()
        .await
        .map_err(CycleError::MarketUnavailable)?;

    Ok(build_books(orders, orientation))
}

/// Puts every valid order into the book of its pair, as a bid when it buys
/// the book's base and as an ask otherwise.
pub fn build_books(orders: Vec<Order>, orientation: Orientation) -> BookSet {
    let mut set: HashMap<PairKey, Book> = HashMap::new();
    let mut rejected = 0;

    for order in orders {
        if let Err(e) = order.validate() {
            warn!(error = %e, "Rejecting order");
            rejected += 1;
            continue;
        }

        let placed = match orientation {
            Orientation::FirstSeen => place_first_seen(&mut set, order),
            Orientation::Lexicographic => place_lexicographic(&mut set, order),
        };
        if let Err(e) = placed {
            warn!(error = %e, "Rejecting order");
            rejected += 1;
        }
    }

    debug!(books = set.len(), rejected, "Books built");

    BookSet {
        books: set.into_values().collect(),
        rejected,
    }
}

fn place_first_seen(set: &mut HashMap<PairKey, Book>, order: Order) -> Result<(), BookError> {
    let pair = ordered_pair(&order.buy_token, &order.sell_token);
    if let Some(book) = set.get_mut(&pair) {
        return book.add_bid(order);
    }

    let inverse = ordered_pair(&order.sell_token, &order.buy_token);
    if let Some(book) = set.get_mut(&inverse) {
        return book.add_ask(order);
    }

    let mut book = Book::new(order.buy_token.clone(), order.sell_token.clone());
    book.add_bid(order)?;
    set.insert(pair, book);
    Ok(())
}

fn place_lexicographic(set: &mut HashMap<PairKey, Book>, order: Order) -> Result<(), BookError> {
    let (base, quote) = if order.buy_token < order.sell_token {
        (&order.buy_token, &order.sell_token)
    } else {
        (&order.sell_token, &order.buy_token)
    };

    let book = set
        .entry(ordered_pair(base, quote))
        .or_insert_with(|| Book::new(base.clone(), quote.clone()));

    if order.buy_token == book.base {
        book.add_bid(order)
    } else {
        book.add_ask(order)
    }
}
