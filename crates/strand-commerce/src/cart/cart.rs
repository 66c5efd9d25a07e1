//! Cart and cart-line types.

use crate::error::CommerceError;
use crate::ids::{CartId, ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_LINE: i64 = 9999;

/// UI-facing cart lifecycle status. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

/// One (product, variant, quantity) entry in a cart.
///
/// At most one line exists per (product, variant) pair; adding the same
/// pair again increments the quantity instead of duplicating the line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Selected variant.
    pub variant_id: VariantId,
    /// Quantity, always >= 1. A line that would reach 0 is deleted.
    pub quantity: i64,
}

/// A shopping cart.
///
/// This is the ephemeral flavor of the cart store: it lives in client
/// memory, mutates synchronously, and is reconciled with durable storage
/// by the synchronizer after each mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    /// Durable cart identifier, absent until the first persisted mutation.
    pub id: Option<CartId>,
    /// Lines, order-irrelevant.
    pub lines: Vec<CartLine>,
    /// UI-facing status.
    pub status: CartStatus,
}

impl Cart {
    /// Create an empty cart with no durable identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cart bound to a durable cart row.
    pub fn with_id(id: CartId) -> Self {
        Self {
            id: Some(id),
            lines: Vec::new(),
            status: CartStatus::Idle,
        }
    }

    /// Add `quantity` of a (product, variant) pair.
    ///
    /// Merges into an existing line for the same pair; otherwise appends
    /// a new line. Errors if the quantity is not positive or the merged
    /// quantity would exceed [`MAX_QUANTITY_PER_LINE`].
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self.line_mut(&product_id, &variant_id) {
            let merged = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if merged > MAX_QUANTITY_PER_LINE {
                return Err(CommerceError::QuantityExceedsLimit(
                    merged,
                    MAX_QUANTITY_PER_LINE,
                ));
            }
            existing.quantity = merged;
            return Ok(());
        }

        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }

        self.lines.push(CartLine {
            product_id,
            variant_id,
            quantity,
        });
        Ok(())
    }

    /// Set a line's quantity to an absolute value.
    ///
    /// A value <= 0 removes the line. Returns `true` if a line was
    /// changed or removed, `false` if no matching line existed.
    pub fn set_line_quantity(
        &mut self,
        product_id: &ProductId,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_line(product_id, variant_id));
        }
        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }
        match self.line_mut(product_id, variant_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the line matching a (product, variant) pair entirely.
    ///
    /// Removing a pair that is not in the cart is a no-op.
    pub fn remove_line(&mut self, product_id: &ProductId, variant_id: &VariantId) -> bool {
        let len_before = self.lines.len();
        self.lines
            .retain(|l| !(l.product_id == *product_id && l.variant_id == *variant_id));
        self.lines.len() < len_before
    }

    /// Clear all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Look up a line by (product, variant).
    pub fn line(&self, product_id: &ProductId, variant_id: &VariantId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.product_id == *product_id && l.variant_id == *variant_id)
    }

    fn line_mut(
        &mut self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == *product_id && l.variant_id == *variant_id)
    }

    /// Sum of line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (ProductId, VariantId) {
        (ProductId::new("prod-1"), VariantId::new("var-1"))
    }

    #[test]
    fn test_add_line() {
        let mut cart = Cart::new();
        let (pid, vid) = ids();
        cart.add_line(pid, vid, 2).unwrap();
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.lines.len(), 1);
    }

    #[test]
    fn test_add_same_pair_merges() {
        let mut cart = Cart::new();
        let (pid, vid) = ids();
        cart.add_line(pid.clone(), vid.clone(), 2).unwrap();
        cart.add_line(pid, vid, 1).unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_same_product_different_variant_is_separate_line() {
        let mut cart = Cart::new();
        let pid = ProductId::new("prod-1");
        cart.add_line(pid.clone(), VariantId::new("var-1"), 1).unwrap();
        cart.add_line(pid, VariantId::new("var-2"), 1).unwrap();
        assert_eq!(cart.lines.len(), 2);
    }

    #[test]
    fn test_set_quantity_absolute() {
        let mut cart = Cart::new();
        let (pid, vid) = ids();
        cart.add_line(pid.clone(), vid.clone(), 2).unwrap();
        assert!(cart.set_line_quantity(&pid, &vid, 5).unwrap());
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        let (pid, vid) = ids();
        cart.add_line(pid.clone(), vid.clone(), 2).unwrap();
        assert!(cart.set_line_quantity(&pid, &vid, 0).unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_pair_is_noop() {
        let mut cart = Cart::new();
        let (pid, vid) = ids();
        cart.add_line(pid.clone(), vid, 1).unwrap();
        let before = cart.clone();
        assert!(!cart.remove_line(&pid, &VariantId::new("other")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_quantity_cap() {
        let mut cart = Cart::new();
        let (pid, vid) = ids();
        assert!(cart
            .add_line(pid.clone(), vid.clone(), MAX_QUANTITY_PER_LINE + 1)
            .is_err());
        cart.add_line(pid.clone(), vid.clone(), MAX_QUANTITY_PER_LINE)
            .unwrap();
        assert!(cart.add_line(pid, vid, 1).is_err());
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let mut cart = Cart::new();
        let (pid, vid) = ids();
        assert!(cart.add_line(pid, vid, 0).is_err());
    }
}
