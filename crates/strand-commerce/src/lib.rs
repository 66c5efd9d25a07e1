//! Domain types and logic for the Strand storefront.
//!
//! This crate holds everything the storefront knows about commerce,
//! independent of storage and transport:
//!
//! - **Catalog**: products and their variants
//! - **Cart**: the client-facing cart store, totals, optimistic updates
//! - **Checkout**: shipping-details validation and checkout records
//!
//! # Example
//!
//! ```rust
//! use strand_commerce::prelude::*;
//!
//! let mut cart = Cart::new();
//! let product_id = ProductId::generate();
//! let variant_id = VariantId::generate();
//! cart.add_line(product_id, variant_id, 2).unwrap();
//!
//! let lines = vec![PricedLine::new(Money::from_major(1000, Currency::ISK), 2)];
//! let totals = totals(&lines, Currency::ISK).unwrap();
//! assert_eq!(totals.subtotal.display_amount(), "2000.00");
//! ```

pub mod catalog;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod ids;
pub mod money;

pub use catalog::{Product, ProductVariant};
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::catalog::{Product, ProductVariant};

    pub use crate::cart::{
        totals, Cart, CartCost, CartLine, CartOp, CartStatus, CartTotals, MoneyView,
        OptimisticCart, PricedLine, MAX_QUANTITY_PER_LINE, VAT_RATE,
    };

    pub use crate::checkout::{
        generate_merchant_reference, validate_shipping, CheckoutRecord, CheckoutStatus,
        ShippingDetails, ShippingErrors, ShippingForm,
    };
}
