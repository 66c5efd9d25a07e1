//! Order notifications.
//!
//! Notification is best-effort by contract: checkout success never
//! depends on it. The shipped notifier writes the order summary to the
//! log; the trait is the seam an SMTP transport would plug into.

use strand_commerce::checkout::ShippingDetails;
use strand_commerce::Money;
use thiserror::Error;
use tracing::info;

/// Notification failure.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification failed: {0}")]
    Failed(String),
}

/// One line of an order summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Product name.
    pub name: String,
    /// Variant name.
    pub variant: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price at order time.
    pub unit_price: Money,
}

/// Everything a notification needs to say about a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    /// Merchant reference of the checkout attempt.
    pub merchant_reference_id: String,
    /// The provider's checkout identifier.
    pub checkout_id: String,
    /// Amount charged.
    pub total: Money,
    /// Ordered lines.
    pub lines: Vec<OrderLine>,
    /// Who ordered, and where it goes.
    pub shipping: ShippingDetails,
}

/// Sink for new-order notifications.
pub trait Notifier {
    /// Announce a new order. Failures are the caller's to swallow.
    fn order_placed(&self, order: &OrderSummary) -> Result<(), NotifyError>;
}

/// Notifier that writes the company notification to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn order_placed(&self, order: &OrderSummary) -> Result<(), NotifyError> {
        info!(
            merchant_reference_id = %order.merchant_reference_id,
            checkout_id = %order.checkout_id,
            total = %order.total,
            "new order\n{}",
            company_notification(order)
        );
        Ok(())
    }
}

fn lines_block(order: &OrderSummary) -> String {
    order
        .lines
        .iter()
        .map(|line| {
            format!(
                "{} - {} x{} - {}",
                line.name,
                line.variant,
                line.quantity,
                line.unit_price
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Customer-facing order confirmation text.
pub fn customer_confirmation(order: &OrderSummary) -> String {
    format!(
        "Order Confirmation\n\
         Thank you for your order!\n\n\
         Order Details:\n{}\n\n\
         Total Amount: {}",
        lines_block(order),
        order.total
    )
}

/// Company-facing new-order notification text.
pub fn company_notification(order: &OrderSummary) -> String {
    format!(
        "New Order Received\n\
         Reference ID: {}\n\
         Checkout ID: {}\n\n\
         Customer: {} <{}>\n\
         Kennitala: {}\n\
         Address: {}{}, {}\n\n\
         Order Details:\n{}\n\n\
         Total Amount: {}",
        order.merchant_reference_id,
        order.checkout_id,
        order.shipping.full_name(),
        order.shipping.email,
        order.shipping.kennitala,
        order.shipping.address,
        order
            .shipping
            .apartment
            .as_deref()
            .map(|a| format!(" ({a})"))
            .unwrap_or_default(),
        order.shipping.city,
        lines_block(order),
        order.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_commerce::checkout::{validate_shipping, ShippingForm};
    use strand_commerce::Currency;

    fn order() -> OrderSummary {
        OrderSummary {
            merchant_reference_id: "ref-123".to_string(),
            checkout_id: "checkout_abc".to_string(),
            total: Money::from_major(2000, Currency::ISK),
            lines: vec![OrderLine {
                name: "Chess Set".to_string(),
                variant: "Standard".to_string(),
                quantity: 2,
                unit_price: Money::from_major(1000, Currency::ISK),
            }],
            shipping: validate_shipping(&ShippingForm {
                email: "jon@example.is".to_string(),
                first_name: "Jón".to_string(),
                last_name: "Jónsson".to_string(),
                kennitala: "0101901234".to_string(),
                address: "Laugavegur 1".to_string(),
                apartment: Some("2B".to_string()),
                city: "Reykjavík".to_string(),
                save_info: false,
                marketing_opt_in: false,
            })
            .unwrap(),
        }
    }

    #[test]
    fn test_company_notification_contains_order_facts() {
        let text = company_notification(&order());
        assert!(text.contains("ref-123"));
        assert!(text.contains("checkout_abc"));
        assert!(text.contains("Jón Jónsson"));
        assert!(text.contains("Chess Set - Standard x2"));
        assert!(text.contains("2000.00 ISK"));
        assert!(text.contains("(2B)"));
    }

    #[test]
    fn test_customer_confirmation_omits_identifiers() {
        let text = customer_confirmation(&order());
        assert!(text.contains("Thank you for your order!"));
        assert!(!text.contains("ref-123"));
    }

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.order_placed(&order()).is_ok());
    }
}
