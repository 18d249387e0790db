//! Recalculation of a cart's derived state.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::{CartError, Result};
use crate::models::{Cart, CartTotals};

/// Recomputes totals (and whatever else is derived) after a cart changed hands.
///
/// Evaluation may run business rules that ask for the visitor's current cart.
/// The resolver caches the in-progress cart before calling `evaluate`, so such
/// lookups are answered from the cache instead of re-entering resolution.
#[async_trait]
pub trait CartEvaluator: Send + Sync {
    /// Update `cart` in place.
    async fn evaluate(&self, cart: &mut Cart) -> Result<()>;
}

/// Sums line totals. No discounts, taxes or shipping.
#[derive(Debug, Default, Clone, Copy)]
pub struct TotalsEvaluator;

#[async_trait]
impl CartEvaluator for TotalsEvaluator {
    async fn evaluate(&self, cart: &mut Cart) -> Result<()> {
        let mut subtotal = Decimal::ZERO;
        let mut item_count: u32 = 0;
        for item in &cart.items {
            subtotal = item
                .line_total()
                .and_then(|line| subtotal.checked_add(line))
                .ok_or_else(|| {
                    CartError::Evaluation(format!("cart {} total overflows", cart.guid))
                })?;
            item_count = item_count.checked_add(item.quantity).ok_or_else(|| {
                CartError::Evaluation(format!("cart {} item count overflows", cart.guid))
            })?;
        }

        cart.totals = CartTotals {
            item_count,
            subtotal,
            total: subtotal,
        };
        Ok(())
    }
}
