//! SQLite access layer for the Strand storefront.
//!
//! Thin, typed wrapper over Spin's SQLite interface. Repositories build
//! parameterized statements with [`params!`] and map rows by named
//! column:
//!
//! ```rust,ignore
//! use strand_db::{Db, params};
//!
//! let db = Db::open_default()?;
//! db.execute(
//!     "INSERT INTO cart_items (cart_id, product_id, variant_id, quantity) \
//!      VALUES (?, ?, ?, ?)",
//!     params![cart_id, product_id, variant_id, 1],
//! )?;
//!
//! let rows = db.query(
//!     "SELECT variant_id, quantity FROM cart_items WHERE cart_id = ?",
//!     params![cart_id],
//! )?;
//! for row in rows.iter() {
//!     let quantity = row.integer("quantity")?;
//! }
//! ```
//!
//! SQLite is only reachable inside the Spin runtime; on native targets
//! every operation returns [`DbError::Unsupported`] so a misconfigured
//! test or tool fails loudly instead of silently reading nothing.

mod db;
mod error;
mod types;

pub use db::Db;
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Build a parameter slice for a SQL statement.
///
/// ```rust,ignore
/// let params = params!["cart-1", 42];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
