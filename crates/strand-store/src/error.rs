//! Storage error types.

use thiserror::Error;

/// Errors from the durable storage layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Cart not found.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Checkout record not found.
    #[error("Checkout not found: {0}")]
    CheckoutNotFound(String),

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Domain-level failure while assembling a view.
    #[error("Commerce error: {0}")]
    Commerce(String),
}

impl From<strand_db::DbError> for StoreError {
    fn from(e: strand_db::DbError) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<strand_commerce::CommerceError> for StoreError {
    fn from(e: strand_commerce::CommerceError) -> Self {
        StoreError::Commerce(e.to_string())
    }
}
