//! In-memory storage.
//!
//! Backs tests and the ephemeral cart flavor. State lives behind a
//! single mutex, so the add-path upsert is atomic here the same way the
//! SQL upsert is.

use crate::rows::{CartItemRow, CartRow};
use crate::storage::{CartStorage, CatalogStorage, CheckoutStorage};
use crate::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;
use strand_commerce::checkout::{CheckoutRecord, CheckoutStatus};
use strand_commerce::{CartId, CheckoutId, Product, ProductId, ProductVariant, VariantId};

#[derive(Default)]
struct State {
    products: Vec<Product>,
    variants: Vec<ProductVariant>,
    carts: HashMap<CartId, CartRow>,
    items: Vec<CartItemRow>,
    checkouts: Vec<CheckoutRecord>,
}

/// In-process storage with the same semantics as the SQLite backend.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product.
    pub fn insert_product(&self, product: Product) {
        self.lock().products.push(product);
    }

    /// Seed a variant.
    pub fn insert_variant(&self, variant: ProductVariant) {
        self.lock().variants.push(variant);
    }

    /// Remove a product, leaving any cart rows referencing it dangling.
    /// Lets tests exercise the soft-skip path for stale references.
    pub fn remove_product(&self, id: &ProductId) {
        self.lock().products.retain(|p| p.id != *id);
    }

    /// Remove a variant, leaving any cart rows referencing it dangling.
    pub fn remove_variant(&self, id: &VariantId) {
        self.lock().variants.retain(|v| v.id != *id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a panic mid-mutation; tests should see it.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CatalogStorage for MemoryStorage {
    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.lock();
        let mut products = state.products.clone();
        products.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        Ok(products)
    }

    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.iter().find(|p| p.id == *id).cloned())
    }

    fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, StoreError> {
        Ok(self
            .lock()
            .products
            .iter()
            .find(|p| p.handle == handle)
            .cloned())
    }

    fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let state = self.lock();
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    fn variant(&self, id: &VariantId) -> Result<Option<ProductVariant>, StoreError> {
        Ok(self.lock().variants.iter().find(|v| v.id == *id).cloned())
    }

    fn variants_for(&self, product_id: &ProductId) -> Result<Vec<ProductVariant>, StoreError> {
        Ok(self
            .lock()
            .variants
            .iter()
            .filter(|v| v.product_id == *product_id)
            .cloned()
            .collect())
    }
}

impl CartStorage for MemoryStorage {
    fn create_cart(&self, user_id: Option<&str>) -> Result<CartRow, StoreError> {
        let now = current_timestamp();
        let row = CartRow {
            id: CartId::generate(),
            user_id: user_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.lock().carts.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    fn find_cart(&self, id: &CartId) -> Result<Option<CartRow>, StoreError> {
        Ok(self.lock().carts.get(id).cloned())
    }

    fn upsert_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.carts.contains_key(cart_id) {
            return Err(StoreError::CartNotFound(cart_id.to_string()));
        }
        match state
            .items
            .iter_mut()
            .find(|i| i.cart_id == *cart_id && i.variant_id == *variant_id)
        {
            Some(item) => item.quantity += quantity,
            None => state.items.push(CartItemRow {
                cart_id: cart_id.clone(),
                product_id: product_id.clone(),
                variant_id: variant_id.clone(),
                quantity,
            }),
        }
        if let Some(cart) = state.carts.get_mut(cart_id) {
            cart.updated_at = current_timestamp();
        }
        Ok(())
    }

    fn set_item_quantity(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if quantity <= 0 {
            state
                .items
                .retain(|i| !(i.cart_id == *cart_id && i.variant_id == *variant_id));
            return Ok(());
        }
        if let Some(item) = state
            .items
            .iter_mut()
            .find(|i| i.cart_id == *cart_id && i.variant_id == *variant_id)
        {
            item.quantity = quantity;
        }
        Ok(())
    }

    fn delete_item(&self, cart_id: &CartId, variant_id: &VariantId) -> Result<(), StoreError> {
        self.lock()
            .items
            .retain(|i| !(i.cart_id == *cart_id && i.variant_id == *variant_id));
        Ok(())
    }

    fn items(&self, cart_id: &CartId) -> Result<Vec<CartItemRow>, StoreError> {
        Ok(self
            .lock()
            .items
            .iter()
            .filter(|i| i.cart_id == *cart_id)
            .cloned()
            .collect())
    }

    fn delete_cart(&self, cart_id: &CartId) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.carts.remove(cart_id);
        state.items.retain(|i| i.cart_id != *cart_id);
        Ok(())
    }
}

impl CheckoutStorage for MemoryStorage {
    fn insert_checkout(&self, record: &CheckoutRecord) -> Result<(), StoreError> {
        self.lock().checkouts.push(record.clone());
        Ok(())
    }

    fn checkout(&self, id: &CheckoutId) -> Result<Option<CheckoutRecord>, StoreError> {
        Ok(self.lock().checkouts.iter().find(|c| c.id == *id).cloned())
    }

    fn update_checkout_status(
        &self,
        provider_checkout_id: &str,
        status: CheckoutStatus,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock();
        match state
            .checkouts
            .iter_mut()
            .find(|c| c.provider_checkout_id == provider_checkout_id)
        {
            Some(record) if record.status.can_transition_to(status) => {
                record.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use strand_commerce::{Currency, Money};

    fn seeded() -> (MemoryStorage, Product, ProductVariant) {
        let storage = MemoryStorage::new();
        let product = Product::new("board", "Board", Money::from_major(1000, Currency::ISK));
        let variant = ProductVariant::new(product.id.clone(), "Standard");
        storage.insert_product(product.clone());
        storage.insert_variant(variant.clone());
        (storage, product, variant)
    }

    #[test]
    fn test_catalog_lookups() {
        let (storage, product, variant) = seeded();
        let mut newer = Product::new("pieces", "Pieces", Money::from_major(500, Currency::ISK));
        newer.created_at = product.created_at + 10;
        storage.insert_product(newer.clone());

        let listed = storage.list_products().unwrap();
        assert_eq!(listed.first().map(|p| p.handle.clone()), Some("pieces".to_string()));

        let by_handle = storage.product_by_handle("board").unwrap().unwrap();
        assert_eq!(by_handle.id, product.id);
        assert!(storage.product_by_handle("missing").unwrap().is_none());

        let variants = storage.variants_for(&product.id).unwrap();
        assert_eq!(variants, vec![variant]);
    }

    #[test]
    fn test_upsert_increments_existing_row() {
        let (storage, product, variant) = seeded();
        let cart = storage.create_cart(None).unwrap();
        storage
            .upsert_item(&cart.id, &product.id, &variant.id, 2)
            .unwrap();
        storage
            .upsert_item(&cart.id, &product.id, &variant.id, 1)
            .unwrap();

        let items = storage.items(&cart.id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_upsert_into_unknown_cart_fails() {
        let (storage, product, variant) = seeded();
        let err = storage
            .upsert_item(&CartId::new("nope"), &product.id, &variant.id, 1)
            .unwrap_err();
        assert!(matches!(err, StoreError::CartNotFound(_)));
    }

    #[test]
    fn test_set_quantity_zero_deletes_row() {
        let (storage, product, variant) = seeded();
        let cart = storage.create_cart(None).unwrap();
        storage
            .upsert_item(&cart.id, &product.id, &variant.id, 2)
            .unwrap();
        storage.set_item_quantity(&cart.id, &variant.id, 0).unwrap();
        assert!(storage.items(&cart.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_cart_removes_items() {
        let (storage, product, variant) = seeded();
        let cart = storage.create_cart(None).unwrap();
        storage
            .upsert_item(&cart.id, &product.id, &variant.id, 2)
            .unwrap();
        storage.delete_cart(&cart.id).unwrap();
        assert!(storage.find_cart(&cart.id).unwrap().is_none());
        assert!(storage.items(&cart.id).unwrap().is_empty());
    }

    #[test]
    fn test_checkout_status_transition_guard() {
        use strand_commerce::checkout::{validate_shipping, ShippingForm};

        let storage = MemoryStorage::new();
        let record = CheckoutRecord::new(
            CartId::new("cart-1"),
            "ref-1",
            "chk_1",
            Money::from_major(100, Currency::ISK),
            validate_shipping(&ShippingForm {
                email: "a@b.is".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                kennitala: "0101901234".to_string(),
                address: "X".to_string(),
                apartment: None,
                city: "Y".to_string(),
                save_info: false,
                marketing_opt_in: false,
            })
            .unwrap(),
        );
        storage.insert_checkout(&record).unwrap();

        assert!(storage
            .update_checkout_status("chk_1", CheckoutStatus::Completed)
            .unwrap());
        // Terminal records don't move again.
        assert!(!storage
            .update_checkout_status("chk_1", CheckoutStatus::Failed)
            .unwrap());
        assert!(!storage
            .update_checkout_status("chk_unknown", CheckoutStatus::Completed)
            .unwrap());
    }
}
