//! Checkout module.
//!
//! Shipping-details validation and the checkout record handed to the
//! payment provider.

mod record;
mod shipping;

pub use record::{generate_merchant_reference, CheckoutRecord, CheckoutStatus};
pub use shipping::{validate_shipping, ShippingDetails, ShippingErrors, ShippingForm};
