//! Cart synchronizer.
//!
//! Bridges the client-facing cart and the durable rows. Every mutation
//! goes straight to storage, then the cart view is rebuilt from scratch:
//! rows are re-read, products and variants are batch-resolved, and
//! totals are recomputed against live catalog prices. Nothing trusts a
//! cached amount, so a price change lands in the very next view.

use crate::storage::{CartStorage, CatalogStorage};
use crate::StoreError;
use serde::Serialize;
use std::sync::Arc;
use strand_commerce::cart::{totals, CartCost, CartTotals, PricedLine};
use strand_commerce::{CartId, Currency, Product, ProductId, ProductVariant, VariantId};
use tracing::debug;

/// A cart line resolved against the live catalog.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HydratedLine {
    /// The referenced product.
    pub product: Product,
    /// The selected variant.
    pub variant: ProductVariant,
    /// Stored quantity.
    pub quantity: i64,
}

impl HydratedLine {
    /// The price this line is charged at.
    pub fn unit_price(&self) -> strand_commerce::Money {
        self.variant.effective_price(&self.product)
    }
}

/// The client-visible state of a durable cart.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Resolved lines. Rows whose product or variant no longer resolves
    /// are dropped, not surfaced as errors.
    pub lines: Vec<HydratedLine>,
    /// Sum of line quantities.
    pub total_quantity: i64,
    /// Monetary totals as the API renders them.
    pub cost: CartCost,
    /// Typed totals for callers that keep computing (checkout).
    #[serde(skip)]
    pub totals: CartTotals,
}

impl CartView {
    /// The view of an empty (or stale) cart.
    pub fn empty(currency: Currency) -> Self {
        let totals = CartTotals::empty(currency);
        Self {
            lines: Vec::new(),
            total_quantity: 0,
            cost: totals.cost(),
            totals,
        }
    }
}

/// Synchronizes cart mutations with durable storage.
pub struct CartSync<S> {
    storage: Arc<S>,
    currency: Currency,
}

impl<S> CartSync<S>
where
    S: CartStorage + CatalogStorage,
{
    /// Create a synchronizer over shared storage.
    pub fn new(storage: Arc<S>, currency: Currency) -> Self {
        Self { storage, currency }
    }

    /// The currency views are priced in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Resolve an existing cart id, or create a durable cart on first
    /// use. The caller persists the returned id client-side.
    pub fn get_or_create_cart(
        &self,
        existing: Option<&CartId>,
        user_id: Option<&str>,
    ) -> Result<CartId, StoreError> {
        if let Some(id) = existing {
            if self.storage.find_cart(id)?.is_some() {
                return Ok(id.clone());
            }
            // A stale id is discarded, not an error.
            debug!(cart_id = %id, "stale cart id, creating a new cart");
        }
        Ok(self.storage.create_cart(user_id)?.id)
    }

    /// Whether a cart id still refers to a durable cart.
    pub fn cart_exists(&self, id: &CartId) -> Result<bool, StoreError> {
        Ok(self.storage.find_cart(id)?.is_some())
    }

    /// Add quantity of a variant to a cart and return the fresh view.
    ///
    /// The referenced product and variant must resolve; the row write is
    /// a single atomic upsert.
    pub fn add_to_cart(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<CartView, StoreError> {
        self.storage
            .product(product_id)?
            .ok_or_else(|| StoreError::ProductNotFound(product_id.to_string()))?;
        self.storage
            .variant(variant_id)?
            .ok_or_else(|| StoreError::VariantNotFound(variant_id.to_string()))?;

        self.storage
            .upsert_item(cart_id, product_id, variant_id, quantity)?;
        self.cart_state(cart_id)
    }

    /// Set a line's quantity (absolute). A value <= 0 removes the line.
    pub fn update_quantity(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<CartView, StoreError> {
        self.storage
            .set_item_quantity(cart_id, variant_id, quantity)?;
        self.cart_state(cart_id)
    }

    /// Remove the line for a variant. Removing an absent line is a
    /// no-op.
    pub fn remove_from_cart(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
    ) -> Result<CartView, StoreError> {
        self.storage.delete_item(cart_id, variant_id)?;
        self.cart_state(cart_id)
    }

    /// Drop a cart after a successful checkout handoff.
    pub fn discard_cart(&self, cart_id: &CartId) -> Result<(), StoreError> {
        self.storage.delete_cart(cart_id)
    }

    /// The full client-visible state of a cart: rows re-read, references
    /// batch-resolved, totals recomputed from live prices. A stale cart
    /// id yields the empty view.
    pub fn cart_state(&self, cart_id: &CartId) -> Result<CartView, StoreError> {
        if self.storage.find_cart(cart_id)?.is_none() {
            return Ok(CartView::empty(self.currency));
        }

        let items = self.storage.items(cart_id)?;
        let product_ids: Vec<ProductId> =
            items.iter().map(|i| i.product_id.clone()).collect();
        let products = self.storage.products_by_ids(&product_ids)?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = products.iter().find(|p| p.id == item.product_id);
            let variant = self.storage.variant(&item.variant_id)?;
            match (product, variant) {
                (Some(product), Some(variant)) if variant.product_id == product.id => {
                    lines.push(HydratedLine {
                        product: product.clone(),
                        variant,
                        quantity: item.quantity,
                    });
                }
                _ => {
                    // Dangling reference: the row no longer has a live
                    // product/variant behind it. Skipped, not fatal.
                    debug!(
                        cart_id = %cart_id,
                        variant_id = %item.variant_id,
                        "dropping unresolved cart line"
                    );
                }
            }
        }

        let priced: Vec<PricedLine> = lines
            .iter()
            .map(|l| PricedLine::new(l.unit_price(), l.quantity))
            .collect();
        let cart_totals = totals(&priced, self.currency)?;

        Ok(CartView {
            lines,
            total_quantity: cart_totals.total_quantity,
            cost: cart_totals.cost(),
            totals: cart_totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStorage;
    use strand_commerce::Money;

    fn setup() -> (CartSync<MemoryStorage>, Product, ProductVariant) {
        let storage = Arc::new(MemoryStorage::new());
        let product = Product::new(
            "chess-set",
            "Chess Set",
            Money::from_major(1000, Currency::ISK),
        );
        let variant = ProductVariant::new(product.id.clone(), "Standard");
        storage.insert_product(product.clone());
        storage.insert_variant(variant.clone());
        (CartSync::new(storage, Currency::ISK), product, variant)
    }

    #[test]
    fn test_get_or_create_reuses_live_cart() {
        let (sync, _, _) = setup();
        let id = sync.get_or_create_cart(None, None).unwrap();
        let again = sync.get_or_create_cart(Some(&id), None).unwrap();
        assert_eq!(id, again);
    }

    #[test]
    fn test_stale_cart_id_gets_a_new_cart() {
        let (sync, _, _) = setup();
        let stale = CartId::new("gone");
        let id = sync.get_or_create_cart(Some(&stale), None).unwrap();
        assert_ne!(id, stale);
        assert!(sync.cart_exists(&id).unwrap());
    }

    #[test]
    fn test_add_recomputes_totals_from_live_prices() {
        let (sync, product, variant) = setup();
        let cart_id = sync.get_or_create_cart(None, None).unwrap();
        let view = sync
            .add_to_cart(&cart_id, &product.id, &variant.id, 2)
            .unwrap();

        assert_eq!(view.total_quantity, 2);
        assert_eq!(view.cost.subtotal_amount.amount, "2000.00");
        assert_eq!(view.cost.total_tax_amount.amount, "387.10");
        assert_eq!(view.cost.total_amount.amount, "2000.00");
    }

    #[test]
    fn test_add_twice_merges_rows() {
        let (sync, product, variant) = setup();
        let cart_id = sync.get_or_create_cart(None, None).unwrap();
        sync.add_to_cart(&cart_id, &product.id, &variant.id, 2)
            .unwrap();
        let view = sync
            .add_to_cart(&cart_id, &product.id, &variant.id, 1)
            .unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.total_quantity, 3);
    }

    #[test]
    fn test_add_unknown_variant_fails() {
        let (sync, product, _) = setup();
        let cart_id = sync.get_or_create_cart(None, None).unwrap();
        let err = sync
            .add_to_cart(&cart_id, &product.id, &VariantId::new("nope"), 1)
            .unwrap_err();
        assert!(matches!(err, StoreError::VariantNotFound(_)));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let (sync, product, variant) = setup();
        let cart_id = sync.get_or_create_cart(None, None).unwrap();
        sync.add_to_cart(&cart_id, &product.id, &variant.id, 2)
            .unwrap();
        let view = sync.update_quantity(&cart_id, &variant.id, 0).unwrap();
        assert!(view.lines.is_empty());
        assert_eq!(view.cost.subtotal_amount.amount, "0.00");
    }

    #[test]
    fn test_variant_price_adjustment_wins() {
        let storage = Arc::new(MemoryStorage::new());
        let product = Product::new("board", "Board", Money::from_major(1000, Currency::ISK));
        let deluxe = ProductVariant::new(product.id.clone(), "Deluxe")
            .with_price_adjustment(Money::from_major(1500, Currency::ISK));
        storage.insert_product(product.clone());
        storage.insert_variant(deluxe.clone());

        let sync = CartSync::new(storage, Currency::ISK);
        let cart_id = sync.get_or_create_cart(None, None).unwrap();
        let view = sync
            .add_to_cart(&cart_id, &product.id, &deluxe.id, 1)
            .unwrap();
        assert_eq!(view.cost.subtotal_amount.amount, "1500.00");
    }

    #[test]
    fn test_unresolved_rows_dropped_from_view() {
        let storage = Arc::new(MemoryStorage::new());
        let product = Product::new("a", "A", Money::from_major(1000, Currency::ISK));
        let gone = Product::new("b", "B", Money::from_major(500, Currency::ISK));
        let variant = ProductVariant::new(product.id.clone(), "Std");
        let gone_variant = ProductVariant::new(gone.id.clone(), "Std");
        storage.insert_product(product.clone());
        storage.insert_product(gone.clone());
        storage.insert_variant(variant.clone());
        storage.insert_variant(gone_variant.clone());

        let sync = CartSync::new(Arc::clone(&storage), Currency::ISK);
        let cart_id = sync.get_or_create_cart(None, None).unwrap();
        sync.add_to_cart(&cart_id, &product.id, &variant.id, 1)
            .unwrap();
        sync.add_to_cart(&cart_id, &gone.id, &gone_variant.id, 4)
            .unwrap();

        storage.remove_product(&gone.id);
        let view = sync.cart_state(&cart_id).unwrap();

        // The dangling line contributes neither quantity nor money.
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.total_quantity, 1);
        assert_eq!(view.cost.subtotal_amount.amount, "1000.00");
    }

    #[test]
    fn test_stale_cart_state_is_empty_view() {
        let (sync, _, _) = setup();
        let view = sync.cart_state(&CartId::new("gone")).unwrap();
        assert!(view.lines.is_empty());
        assert_eq!(view.total_quantity, 0);
        assert_eq!(view.cost.total_amount.amount, "0.00");
    }
}
