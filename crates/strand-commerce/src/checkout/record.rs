//! Checkout records.

use crate::checkout::ShippingDetails;
use crate::ids::{CartId, CheckoutId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Status of a checkout attempt.
///
/// Created as `Pending`; moved to a terminal state by the payment
/// provider's return/webhook flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
    Failed,
}

impl CheckoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStatus::Pending => "pending",
            CheckoutStatus::Completed => "completed",
            CheckoutStatus::Cancelled => "cancelled",
            CheckoutStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CheckoutStatus::Pending),
            "completed" => Some(CheckoutStatus::Completed),
            "cancelled" => Some(CheckoutStatus::Cancelled),
            "failed" => Some(CheckoutStatus::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CheckoutStatus::Pending)
    }

    /// Whether a transition to `next` is allowed. Only `Pending` moves.
    pub fn can_transition_to(&self, next: CheckoutStatus) -> bool {
        *self == CheckoutStatus::Pending && next != CheckoutStatus::Pending
    }
}

/// A checkout attempt, linking a cart to the payment provider's hosted
/// checkout session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutRecord {
    /// Local record identifier, appended to the redirect URL for
    /// correlation on return.
    pub id: CheckoutId,
    /// Cart this checkout was created from.
    pub cart_id: CartId,
    /// Fresh random token correlating this attempt with the provider.
    /// Unique per attempt.
    pub merchant_reference_id: String,
    /// The provider's checkout session identifier.
    pub provider_checkout_id: String,
    /// Amount charged.
    pub amount: Money,
    /// Validated shipping details.
    pub shipping: ShippingDetails,
    /// Attempt status.
    pub status: CheckoutStatus,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl CheckoutRecord {
    /// Create a new pending record.
    pub fn new(
        cart_id: CartId,
        merchant_reference_id: impl Into<String>,
        provider_checkout_id: impl Into<String>,
        amount: Money,
        shipping: ShippingDetails,
    ) -> Self {
        Self {
            id: CheckoutId::generate(),
            cart_id,
            merchant_reference_id: merchant_reference_id.into(),
            provider_checkout_id: provider_checkout_id.into(),
            amount,
            shipping,
            status: CheckoutStatus::Pending,
            created_at: current_timestamp(),
        }
    }
}

/// Generate a merchant reference identifier: a fresh random 128-bit
/// token, generated before the payment provider is contacted.
pub fn generate_merchant_reference() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
