//! Durable storage and cart synchronization for the Strand storefront.
//!
//! The storage traits come in two implementations: [`DbStorage`] over
//! SQLite for the deployed storefront, and [`MemoryStorage`] for tests
//! and ephemeral carts. [`CartSync`] sits on top and keeps the durable
//! rows and the client-visible cart view in step: every mutation is
//! followed by a recomputation of totals against live catalog prices.

mod error;
mod memory;
mod rows;
mod sqlite;
mod storage;
mod sync;

pub use error::StoreError;
pub use memory::MemoryStorage;
pub use rows::{CartItemRow, CartRow};
pub use sqlite::DbStorage;
pub use storage::{CartStorage, CatalogStorage, CheckoutStorage};
pub use sync::{CartSync, CartView, HydratedLine};
