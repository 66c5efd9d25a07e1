//! Shopping cart module.
//!
//! The client-facing cart store, the shared totals computation, and the
//! optimistic-update projection.

mod cart;
mod optimistic;
mod totals;

pub use cart::{Cart, CartLine, CartStatus, MAX_QUANTITY_PER_LINE};
pub use optimistic::{CartOp, OptimisticCart};
pub use totals::{totals, CartCost, CartTotals, MoneyView, PricedLine, VAT_RATE};
