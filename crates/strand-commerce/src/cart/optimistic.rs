//! Optimistic cart projection.
//!
//! Cart mutations apply to local state immediately so the UI reflects
//! intent before the durable round trip resolves. Each mutation is also
//! queued; when the durable write later fails, the projection is rebuilt
//! from the last confirmed snapshot plus the operations still in flight,
//! instead of silently diverging from storage.

use crate::cart::{Cart, CartStatus};
use crate::error::CommerceError;
use crate::ids::{ProductId, VariantId};
use std::collections::VecDeque;

/// A cart mutation, as queued for the durable store.
#[derive(Debug, Clone, PartialEq)]
pub enum CartOp {
    /// Add quantity of a (product, variant) pair, merging lines.
    Add {
        product_id: ProductId,
        variant_id: VariantId,
        quantity: i64,
    },
    /// Set a line's quantity to an absolute value (<= 0 removes it).
    SetQuantity {
        product_id: ProductId,
        variant_id: VariantId,
        quantity: i64,
    },
    /// Remove a line entirely.
    Remove {
        product_id: ProductId,
        variant_id: VariantId,
    },
}

fn apply_op(cart: &mut Cart, op: &CartOp) -> Result<(), CommerceError> {
    match op {
        CartOp::Add {
            product_id,
            variant_id,
            quantity,
        } => cart.add_line(product_id.clone(), variant_id.clone(), *quantity),
        CartOp::SetQuantity {
            product_id,
            variant_id,
            quantity,
        } => cart
            .set_line_quantity(product_id, variant_id, *quantity)
            .map(|_| ()),
        CartOp::Remove {
            product_id,
            variant_id,
        } => {
            cart.remove_line(product_id, variant_id);
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
struct PendingOp {
    seq: u64,
    op: CartOp,
}

/// A cart with optimistic local state and a pending-operation queue.
#[derive(Debug, Clone)]
pub struct OptimisticCart {
    /// Last state known to match durable storage.
    confirmed: Cart,
    /// What the UI renders: confirmed state plus pending operations.
    projection: Cart,
    pending: VecDeque<PendingOp>,
    next_seq: u64,
}

impl OptimisticCart {
    /// Start from an authoritative snapshot.
    pub fn new(confirmed: Cart) -> Self {
        let projection = confirmed.clone();
        Self {
            confirmed,
            projection,
            pending: VecDeque::new(),
            next_seq: 0,
        }
    }

    /// The cart the UI should render.
    pub fn cart(&self) -> &Cart {
        &self.projection
    }

    /// Number of operations awaiting durable confirmation.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Apply a mutation to the projection and queue it for storage.
    ///
    /// Returns a sequence number to pass back to [`confirm`] or
    /// [`reject`] once the durable write resolves.
    ///
    /// [`confirm`]: OptimisticCart::confirm
    /// [`reject`]: OptimisticCart::reject
    pub fn apply(&mut self, op: CartOp) -> Result<u64, CommerceError> {
        apply_op(&mut self.projection, &op)?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back(PendingOp { seq, op });
        self.projection.status = CartStatus::Loading;
        Ok(seq)
    }

    /// Mark a queued operation as durably written.
    pub fn confirm(&mut self, seq: u64) {
        if let Some(pos) = self.pending.iter().position(|p| p.seq == seq) {
            if let Some(p) = self.pending.remove(pos) {
                // The op already applied cleanly to the projection; a
                // failure against the older confirmed state means the two
                // have diverged, and the projection is the better truth.
                if apply_op(&mut self.confirmed, &p.op).is_err() {
                    self.confirmed = self.projection.clone();
                }
            }
        }
        if self.pending.is_empty() {
            self.projection.status = CartStatus::Idle;
        }
    }

    /// Mark a queued operation as failed and revert its effect.
    ///
    /// The projection is rebuilt from the confirmed snapshot plus the
    /// operations still pending; the failed operation is dropped.
    pub fn reject(&mut self, seq: u64) {
        self.pending.retain(|p| p.seq != seq);
        self.rebuild();
        self.projection.status = CartStatus::Error;
    }

    /// Replace the confirmed snapshot with a re-fetched authoritative
    /// cart and replay the still-pending operations on top of it.
    pub fn refresh(&mut self, authoritative: Cart) {
        self.confirmed = authoritative;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let mut rebuilt = self.confirmed.clone();
        // Pending ops that no longer apply (e.g. a merge that now busts
        // the quantity cap) are dropped rather than wedging the queue.
        self.pending
            .retain(|p| apply_op(&mut rebuilt, &p.op).is_ok());
        rebuilt.status = if self.pending.is_empty() {
            CartStatus::Idle
        } else {
            CartStatus::Loading
        };
        self.projection = rebuilt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (ProductId, VariantId) {
        (ProductId::new("prod-1"), VariantId::new("var-1"))
    }

    fn add(quantity: i64) -> CartOp {
        let (product_id, variant_id) = ids();
        CartOp::Add {
            product_id,
            variant_id,
            quantity,
        }
    }

    #[test]
    fn test_apply_is_immediately_visible() {
        let mut cart = OptimisticCart::new(Cart::new());
        cart.apply(add(2)).unwrap();
        assert_eq!(cart.cart().total_quantity(), 2);
        assert_eq!(cart.cart().status, CartStatus::Loading);
    }

    #[test]
    fn test_confirm_settles_state() {
        let mut cart = OptimisticCart::new(Cart::new());
        let seq = cart.apply(add(2)).unwrap();
        cart.confirm(seq);
        assert_eq!(cart.cart().total_quantity(), 2);
        assert_eq!(cart.cart().status, CartStatus::Idle);
        assert_eq!(cart.pending_len(), 0);
    }

    #[test]
    fn test_reject_reverts_failed_op() {
        let mut cart = OptimisticCart::new(Cart::new());
        let seq = cart.apply(add(2)).unwrap();
        cart.reject(seq);
        assert!(cart.cart().is_empty());
        assert_eq!(cart.cart().status, CartStatus::Error);
    }

    #[test]
    fn test_reject_keeps_other_pending_ops() {
        let (pid, vid) = ids();
        let mut cart = OptimisticCart::new(Cart::new());
        let first = cart.apply(add(2)).unwrap();
        let _second = cart.apply(CartOp::Add {
            product_id: pid.clone(),
            variant_id: VariantId::new("var-2"),
            quantity: 1,
        });
        cart.reject(first);
        // The surviving op is replayed on top of the confirmed snapshot.
        assert_eq!(cart.cart().total_quantity(), 1);
        assert!(cart.cart().line(&pid, &vid).is_none());
    }

    #[test]
    fn test_refresh_replays_pending_on_new_snapshot() {
        let (pid, vid) = ids();
        let mut authoritative = Cart::new();
        authoritative.add_line(pid.clone(), vid.clone(), 5).unwrap();

        let mut cart = OptimisticCart::new(Cart::new());
        cart.apply(add(2)).unwrap();
        cart.refresh(authoritative);

        // 5 confirmed + 2 still pending.
        assert_eq!(cart.cart().line(&pid, &vid).map(|l| l.quantity), Some(7));
    }
}
