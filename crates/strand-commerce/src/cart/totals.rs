//! Cart totals.
//!
//! One totals computation serves both the cart-display path and the
//! checkout path, so the two can never disagree on rounding. Prices are
//! tax-inclusive: VAT is backed out of the subtotal, never added on top.

use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Icelandic VAT rate for physical goods.
pub const VAT_RATE: f64 = 0.24;

/// A cart line reduced to what pricing needs: an effective unit price
/// and a quantity. Lines whose product or variant could not be resolved
/// are dropped before this point and never reach the computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    /// Effective unit price (variant adjustment or product base price).
    pub unit_price: Money,
    /// Quantity, >= 1.
    pub quantity: i64,
}

impl PricedLine {
    /// Create a priced line.
    pub fn new(unit_price: Money, quantity: i64) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }
}

/// Totals for a cart.
///
/// `total` always equals `subtotal`: prices already contain VAT, and the
/// tax component is derived from the subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub total_quantity: i64,
    /// Sum of unit price x quantity over all lines.
    pub subtotal: Money,
    /// VAT contained in the subtotal: `subtotal - subtotal / (1 + VAT_RATE)`.
    pub total_tax: Money,
    /// Amount charged. Equal to the subtotal under tax-inclusive pricing.
    pub total: Money,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub fn empty(currency: Currency) -> Self {
        Self {
            total_quantity: 0,
            subtotal: Money::zero(currency),
            total_tax: Money::zero(currency),
            total: Money::zero(currency),
        }
    }

    /// The API projection of the monetary components.
    pub fn cost(&self) -> CartCost {
        CartCost {
            subtotal_amount: MoneyView::from(self.subtotal),
            total_amount: MoneyView::from(self.total),
            total_tax_amount: MoneyView::from(self.total_tax),
        }
    }
}

/// Compute totals for a list of priced lines.
///
/// Errors on currency mismatch between lines and on arithmetic overflow.
pub fn totals(lines: &[PricedLine], currency: Currency) -> Result<CartTotals, CommerceError> {
    let mut total_quantity: i64 = 0;
    let mut subtotal = Money::zero(currency);

    for line in lines {
        if line.unit_price.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: line.unit_price.currency.code().to_string(),
            });
        }
        let line_total = line
            .unit_price
            .try_multiply(line.quantity)
            .ok_or(CommerceError::Overflow)?;
        subtotal = subtotal.try_add(&line_total).ok_or(CommerceError::Overflow)?;
        total_quantity = total_quantity
            .checked_add(line.quantity)
            .ok_or(CommerceError::Overflow)?;
    }

    // VAT is backed out of the tax-inclusive subtotal. Rounding happens
    // once, on the pre-tax component, in minor units.
    let pre_tax = (subtotal.amount_minor as f64 / (1.0 + VAT_RATE)).round() as i64;
    let total_tax = Money::new(subtotal.amount_minor - pre_tax, currency);

    Ok(CartTotals {
        total_quantity,
        subtotal,
        total_tax,
        total: subtotal,
    })
}

/// A monetary amount as the API renders it: a fixed-point decimal string
/// plus a currency code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoneyView {
    /// Fixed-point amount with two fraction digits, e.g. "2000.00".
    pub amount: String,
    /// ISO currency code.
    pub currency_code: String,
}

impl From<Money> for MoneyView {
    fn from(money: Money) -> Self {
        Self {
            amount: money.display_amount(),
            currency_code: money.currency.code().to_string(),
        }
    }
}

/// The cost block of a cart view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    /// Subtotal of all lines.
    pub subtotal_amount: MoneyView,
    /// Amount charged; equals the subtotal.
    pub total_amount: MoneyView,
    /// VAT contained in the total.
    pub total_tax_amount: MoneyView,
}
