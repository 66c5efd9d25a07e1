//! Durable row types.

use serde::{Deserialize, Serialize};
use strand_commerce::{CartId, ProductId, VariantId};

/// A row of the `carts` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartRow {
    /// Server-generated cart identifier.
    pub id: CartId,
    /// Owning user, when the cart belongs to a signed-in customer.
    pub user_id: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last mutation.
    pub updated_at: i64,
}

/// A row of the `cart_items` table. One row per (cart, variant).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItemRow {
    /// Cart this line belongs to.
    pub cart_id: CartId,
    /// Product reference.
    pub product_id: ProductId,
    /// Variant reference; unique within a cart.
    pub variant_id: VariantId,
    /// Stored quantity, always >= 1.
    pub quantity: i64,
}
