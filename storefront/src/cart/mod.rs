//! Shopping cart: line items keyed by product, with derived totals.

mod reducer;
mod types;

pub use reducer::{CartAction, CartEnv, CartReducer};
pub use types::{CartLine, CartSnapshot, CartState};
