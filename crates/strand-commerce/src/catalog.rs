//! Product and variant types.
//!
//! The catalog is owned by an external collaborator; from the cart's
//! perspective these types are read-only snapshots of what is currently
//! purchasable.

use crate::ids::{ProductId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// URL-friendly slug (unique).
    pub handle: String,
    /// Product name.
    pub name: String,
    /// Full description.
    pub description: Option<String>,
    /// Base price, used when the selected variant carries no adjustment.
    pub base_price: Money,
    /// Whether the product can currently be purchased.
    pub available: bool,
    /// Primary image reference.
    pub image_url: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new product.
    pub fn new(handle: impl Into<String>, name: impl Into<String>, base_price: Money) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            handle: handle.into(),
            name: name.into(),
            description: None,
            base_price,
            available: true,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// A product variant. Exactly one variant is selected per cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    /// Unique variant identifier.
    pub id: VariantId,
    /// Parent product ID.
    pub product_id: ProductId,
    /// Variant name (e.g. "Large").
    pub name: String,
    /// Price override; when absent the product's base price applies.
    pub price_adjustment: Option<Money>,
    /// Whether the variant can currently be purchased.
    pub available: bool,
}

impl ProductVariant {
    /// Create a new variant priced at the product's base price.
    pub fn new(product_id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id: VariantId::generate(),
            product_id,
            name: name.into(),
            price_adjustment: None,
            available: true,
        }
    }

    /// Override the product's base price for this variant.
    pub fn with_price_adjustment(mut self, price: Money) -> Self {
        self.price_adjustment = Some(price);
        self
    }

    /// The price a cart line with this variant is charged at: the
    /// variant's adjustment if present, else the product's base price.
    pub fn effective_price(&self, product: &Product) -> Money {
        self.price_adjustment.unwrap_or(product.base_price)
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
