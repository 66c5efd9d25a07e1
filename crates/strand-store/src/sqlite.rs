//! SQLite-backed storage.
//!
//! Column layout mirrors the storefront schema: prices are INTEGER minor
//! units in the shop currency, booleans are 0/1, timestamps are Unix
//! seconds. The add-path upsert leans on `ON CONFLICT .. DO UPDATE` so
//! concurrent adds to the same line both land instead of racing through
//! a read-then-write.

use crate::rows::{CartItemRow, CartRow};
use crate::storage::{CartStorage, CatalogStorage, CheckoutStorage};
use crate::StoreError;
use strand_commerce::checkout::{CheckoutRecord, CheckoutStatus, ShippingDetails};
use strand_commerce::{
    CartId, CheckoutId, Currency, Money, Product, ProductId, ProductVariant, VariantId,
};
use strand_db::{params, Db, Row};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    handle TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    base_price INTEGER NOT NULL,
    is_available INTEGER NOT NULL DEFAULT 1,
    image_url TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS product_variants (
    id TEXT PRIMARY KEY,
    product_id TEXT NOT NULL REFERENCES products(id),
    name TEXT NOT NULL,
    price_adjustment INTEGER,
    is_available INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS carts (
    id TEXT PRIMARY KEY,
    user_id TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS cart_items (
    cart_id TEXT NOT NULL REFERENCES carts(id),
    product_id TEXT NOT NULL,
    variant_id TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    UNIQUE (cart_id, variant_id)
);
CREATE TABLE IF NOT EXISTS checkouts (
    id TEXT PRIMARY KEY,
    cart_id TEXT NOT NULL,
    merchant_reference_id TEXT NOT NULL,
    checkout_id TEXT NOT NULL,
    amount INTEGER NOT NULL,
    email TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    kennitala TEXT NOT NULL,
    address TEXT NOT NULL,
    apartment TEXT,
    city TEXT NOT NULL,
    save_info INTEGER NOT NULL DEFAULT 0,
    marketing_opt_in INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at INTEGER NOT NULL
);
";

/// Storage over a SQLite database.
pub struct DbStorage {
    db: Db,
    currency: Currency,
}

impl DbStorage {
    /// Wrap an open database. Prices read from rows are interpreted in
    /// `currency`.
    pub fn new(db: Db, currency: Currency) -> Self {
        Self { db, currency }
    }

    /// Create any missing tables.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';') {
            let statement = statement.trim();
            if !statement.is_empty() {
                self.db.execute(statement, params![])?;
            }
        }
        Ok(())
    }

    fn product_from_row(&self, row: &Row) -> Result<Product, StoreError> {
        Ok(Product {
            id: ProductId::new(row.text("id")?),
            handle: row.text("handle")?.to_string(),
            name: row.text("name")?.to_string(),
            description: row.opt_text("description")?.map(str::to_string),
            base_price: Money::new(row.integer("base_price")?, self.currency),
            available: row.boolean("is_available")?,
            image_url: row.opt_text("image_url")?.map(str::to_string),
            created_at: row.integer("created_at")?,
            updated_at: row.integer("updated_at")?,
        })
    }

    fn variant_from_row(&self, row: &Row) -> Result<ProductVariant, StoreError> {
        Ok(ProductVariant {
            id: VariantId::new(row.text("id")?),
            product_id: ProductId::new(row.text("product_id")?),
            name: row.text("name")?.to_string(),
            price_adjustment: row
                .opt_integer("price_adjustment")?
                .map(|minor| Money::new(minor, self.currency)),
            available: row.boolean("is_available")?,
        })
    }

    fn cart_from_row(row: &Row) -> Result<CartRow, StoreError> {
        Ok(CartRow {
            id: CartId::new(row.text("id")?),
            user_id: row.opt_text("user_id")?.map(str::to_string),
            created_at: row.integer("created_at")?,
            updated_at: row.integer("updated_at")?,
        })
    }

    fn checkout_from_row(&self, row: &Row) -> Result<CheckoutRecord, StoreError> {
        let status = CheckoutStatus::from_str(row.text("status")?)
            .ok_or_else(|| StoreError::Database(format!("bad checkout status: {}", row.text("status").unwrap_or("?"))))?;
        Ok(CheckoutRecord {
            id: CheckoutId::new(row.text("id")?),
            cart_id: CartId::new(row.text("cart_id")?),
            merchant_reference_id: row.text("merchant_reference_id")?.to_string(),
            provider_checkout_id: row.text("checkout_id")?.to_string(),
            amount: Money::new(row.integer("amount")?, self.currency),
            shipping: ShippingDetails {
                email: row.text("email")?.to_string(),
                first_name: row.text("first_name")?.to_string(),
                last_name: row.text("last_name")?.to_string(),
                kennitala: row.text("kennitala")?.to_string(),
                address: row.text("address")?.to_string(),
                apartment: row.opt_text("apartment")?.map(str::to_string),
                city: row.text("city")?.to_string(),
                save_info: row.boolean("save_info")?,
                marketing_opt_in: row.boolean("marketing_opt_in")?,
            },
            status,
            created_at: row.integer("created_at")?,
        })
    }
}

impl CatalogStorage for DbStorage {
    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = self.db.query(
            "SELECT * FROM products ORDER BY created_at DESC",
            params![],
        )?;
        rows.iter().map(|r| self.product_from_row(r)).collect()
    }

    fn product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        self.db
            .query_optional("SELECT * FROM products WHERE id = ?", params![id.as_str()])?
            .map(|r| self.product_from_row(&r))
            .transpose()
    }

    fn product_by_handle(&self, handle: &str) -> Result<Option<Product>, StoreError> {
        self.db
            .query_optional("SELECT * FROM products WHERE handle = ?", params![handle])?
            .map(|r| self.product_from_row(&r))
            .transpose()
    }

    fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM products WHERE id IN ({placeholders})");
        let values: Vec<strand_db::Value> =
            ids.iter().map(|id| strand_db::Value::from(id.as_str())).collect();
        let rows = self.db.query(&sql, &values)?;
        rows.iter().map(|r| self.product_from_row(r)).collect()
    }

    fn variant(&self, id: &VariantId) -> Result<Option<ProductVariant>, StoreError> {
        self.db
            .query_optional(
                "SELECT * FROM product_variants WHERE id = ?",
                params![id.as_str()],
            )?
            .map(|r| self.variant_from_row(&r))
            .transpose()
    }

    fn variants_for(&self, product_id: &ProductId) -> Result<Vec<ProductVariant>, StoreError> {
        let rows = self.db.query(
            "SELECT * FROM product_variants WHERE product_id = ?",
            params![product_id.as_str()],
        )?;
        rows.iter().map(|r| self.variant_from_row(r)).collect()
    }
}

impl CartStorage for DbStorage {
    fn create_cart(&self, user_id: Option<&str>) -> Result<CartRow, StoreError> {
        let row = CartRow {
            id: CartId::generate(),
            user_id: user_id.map(str::to_string),
            created_at: current_timestamp(),
            updated_at: current_timestamp(),
        };
        self.db.execute(
            "INSERT INTO carts (id, user_id, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![
                row.id.as_str(),
                row.user_id.clone(),
                row.created_at,
                row.updated_at
            ],
        )?;
        Ok(row)
    }

    fn find_cart(&self, id: &CartId) -> Result<Option<CartRow>, StoreError> {
        self.db
            .query_optional("SELECT * FROM carts WHERE id = ?", params![id.as_str()])?
            .map(|r| Self::cart_from_row(&r))
            .transpose()
    }

    fn upsert_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        if self.find_cart(cart_id)?.is_none() {
            return Err(StoreError::CartNotFound(cart_id.to_string()));
        }
        self.db.execute(
            "INSERT INTO cart_items (cart_id, product_id, variant_id, quantity) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (cart_id, variant_id) \
             DO UPDATE SET quantity = quantity + excluded.quantity",
            params![
                cart_id.as_str(),
                product_id.as_str(),
                variant_id.as_str(),
                quantity
            ],
        )?;
        self.db.execute(
            "UPDATE carts SET updated_at = ? WHERE id = ?",
            params![current_timestamp(), cart_id.as_str()],
        )?;
        Ok(())
    }

    fn set_item_quantity(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        if quantity <= 0 {
            return self.delete_item(cart_id, variant_id);
        }
        self.db.execute(
            "UPDATE cart_items SET quantity = ? WHERE cart_id = ? AND variant_id = ?",
            params![quantity, cart_id.as_str(), variant_id.as_str()],
        )?;
        Ok(())
    }

    fn delete_item(&self, cart_id: &CartId, variant_id: &VariantId) -> Result<(), StoreError> {
        self.db.execute(
            "DELETE FROM cart_items WHERE cart_id = ? AND variant_id = ?",
            params![cart_id.as_str(), variant_id.as_str()],
        )?;
        Ok(())
    }

    fn items(&self, cart_id: &CartId) -> Result<Vec<CartItemRow>, StoreError> {
        let rows = self.db.query(
            "SELECT cart_id, product_id, variant_id, quantity \
             FROM cart_items WHERE cart_id = ?",
            params![cart_id.as_str()],
        )?;
        rows.iter()
            .map(|row| {
                Ok(CartItemRow {
                    cart_id: CartId::new(row.text("cart_id")?),
                    product_id: ProductId::new(row.text("product_id")?),
                    variant_id: VariantId::new(row.text("variant_id")?),
                    quantity: row.integer("quantity")?,
                })
            })
            .collect()
    }

    fn delete_cart(&self, cart_id: &CartId) -> Result<(), StoreError> {
        self.db.execute(
            "DELETE FROM cart_items WHERE cart_id = ?",
            params![cart_id.as_str()],
        )?;
        self.db
            .execute("DELETE FROM carts WHERE id = ?", params![cart_id.as_str()])?;
        Ok(())
    }
}

impl CheckoutStorage for DbStorage {
    fn insert_checkout(&self, record: &CheckoutRecord) -> Result<(), StoreError> {
        self.db.execute(
            "INSERT INTO checkouts (id, cart_id, merchant_reference_id, checkout_id, \
             amount, email, first_name, last_name, kennitala, address, apartment, city, \
             save_info, marketing_opt_in, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id.as_str(),
                record.cart_id.as_str(),
                record.merchant_reference_id.as_str(),
                record.provider_checkout_id.as_str(),
                record.amount.amount_minor,
                record.shipping.email.as_str(),
                record.shipping.first_name.as_str(),
                record.shipping.last_name.as_str(),
                record.shipping.kennitala.as_str(),
                record.shipping.address.as_str(),
                record.shipping.apartment.clone(),
                record.shipping.city.as_str(),
                record.shipping.save_info,
                record.shipping.marketing_opt_in,
                record.status.as_str(),
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn checkout(&self, id: &CheckoutId) -> Result<Option<CheckoutRecord>, StoreError> {
        self.db
            .query_optional("SELECT * FROM checkouts WHERE id = ?", params![id.as_str()])?
            .map(|r| self.checkout_from_row(&r))
            .transpose()
    }

    fn update_checkout_status(
        &self,
        provider_checkout_id: &str,
        status: CheckoutStatus,
    ) -> Result<bool, StoreError> {
        // Conditional on the current status so a late webhook can't
        // overwrite a terminal state.
        self.db.execute(
            "UPDATE checkouts SET status = ? WHERE checkout_id = ? AND status = 'pending'",
            params![status.as_str(), provider_checkout_id],
        )?;
        let row = self.db.query_optional("SELECT changes() AS n", params![])?;
        match row {
            Some(row) => Ok(row.integer("n")? > 0),
            None => Ok(false),
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
