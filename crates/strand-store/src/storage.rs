//! Storage traits.
//!
//! The storefront is written against these traits; [`crate::DbStorage`]
//! implements them over SQLite and [`crate::MemoryStorage`] in process
//! memory. All methods take `&self`: implementations guard their own
//! interior state, matching the one-request-per-operation model.

use crate::rows::{CartItemRow, CartRow};
use crate::StoreError;
use strand_commerce::checkout::{CheckoutRecord, CheckoutStatus};
use strand_commerce::{CartId, CheckoutId, Product, ProductId, ProductVariant, VariantId};

/// Read access to the product catalog.
pub trait CatalogStorage {
    /// All products, newest first.
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// A product by id.
    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// A product by its URL handle.
    fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, StoreError>;

    /// Batch-resolve products. Unknown ids are simply absent from the
    /// result; callers treat that as a soft skip.
    fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// A variant by id.
    fn variant(&self, id: &VariantId) -> Result<Option<ProductVariant>, StoreError>;

    /// All variants of a product.
    fn variants_for(&self, product_id: &ProductId) -> Result<Vec<ProductVariant>, StoreError>;
}

/// Durable cart rows, keyed by a server-generated cart identifier.
pub trait CartStorage {
    /// Create a new cart row.
    fn create_cart(&self, user_id: Option<&str>) -> Result<CartRow, StoreError>;

    /// A cart row by id.
    fn find_cart(&self, id: &CartId) -> Result<Option<CartRow>, StoreError>;

    /// Add quantity to a (cart, variant) line as one atomic upsert:
    /// inserts the row, or increments the stored quantity when the line
    /// already exists. Two concurrent adds both land.
    fn upsert_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<(), StoreError>;

    /// Set a line's quantity to an absolute value; <= 0 deletes the row.
    fn set_item_quantity(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<(), StoreError>;

    /// Delete the row matching (cart, variant). Deleting an absent row
    /// is a no-op.
    fn delete_item(&self, cart_id: &CartId, variant_id: &VariantId) -> Result<(), StoreError>;

    /// All line rows for a cart.
    fn items(&self, cart_id: &CartId) -> Result<Vec<CartItemRow>, StoreError>;

    /// Delete a cart and its lines.
    fn delete_cart(&self, cart_id: &CartId) -> Result<(), StoreError>;
}

/// Checkout records.
pub trait CheckoutStorage {
    /// Persist a new checkout record.
    fn insert_checkout(&self, record: &CheckoutRecord) -> Result<(), StoreError>;

    /// A checkout record by local id.
    fn checkout(&self, id: &CheckoutId) -> Result<Option<CheckoutRecord>, StoreError>;

    /// Transition a pending checkout, addressed by the provider's
    /// checkout id. Returns `false` when no pending record matched
    /// (already terminal, or unknown id).
    fn update_checkout_status(
        &self,
        provider_checkout_id: &str,
        status: CheckoutStatus,
    ) -> Result<bool, StoreError>;
}
