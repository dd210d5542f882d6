//! Domain models for order-book arbitrage.

mod amount;
mod book;
mod order;
mod twin;

pub(crate) use amount::deserialize as deserialize_amount;
pub use book::{Book, BookError};
pub use order::{Order, OrderError, Rate, Token};
pub use twin::{Fill, Leg, Twin};
