//! Floating cart summary widget.
//!
//! Shows how many units are in the cart and what they cost, and opens the
//! cart screen when tapped. The derived values are memoized on snapshot
//! identity: they are recomputed only after the cart publishes a new
//! snapshot.

use std::sync::Arc;

use go_marketplace_core::{CurrencyCode, LineItems, Price};
use rust_decimal::Decimal;
use tracing::debug;

use crate::context::{Cart, use_cart};
use crate::error::Result;
use crate::navigation::{Navigator, Route};
use crate::provider::Snapshot;

/// Values displayed by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    /// Σ(price × quantity); zero for an empty cart.
    pub total_price: Decimal,
    /// Σ(quantity); zero for an empty cart.
    pub total_items: u64,
    /// `total_price` formatted in the configured currency.
    pub formatted_total: String,
}

impl CartSummary {
    fn compute(items: &LineItems, currency: CurrencyCode) -> Self {
        if items.is_empty() {
            return Self {
                total_price: Decimal::ZERO,
                total_items: 0,
                formatted_total: Price::zero(currency).to_string(),
            };
        }

        let total_price = items.total_price();
        Self {
            total_price,
            total_items: items.total_quantity(),
            formatted_total: Price::new(total_price, currency).to_string(),
        }
    }
}

struct Memo {
    source: Snapshot,
    summary: CartSummary,
}

/// Floating cart button and price tag.
pub struct FloatingCart {
    cart: Cart,
    currency: CurrencyCode,
    memo: Option<Memo>,
    computations: usize,
}

impl FloatingCart {
    /// Mount the widget inside a cart provider scope.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutsideProvider`](crate::CartError::OutsideProvider)
    /// when no provider scope is active.
    pub fn mount(currency: CurrencyCode) -> Result<Self> {
        Ok(Self::new(use_cart()?, currency))
    }

    /// Create the widget for an explicit cart handle.
    #[must_use]
    pub const fn new(cart: Cart, currency: CurrencyCode) -> Self {
        Self {
            cart,
            currency,
            memo: None,
            computations: 0,
        }
    }

    /// Current totals, recomputed only if the cart changed since last call.
    pub fn summary(&mut self) -> &CartSummary {
        let snapshot = self.cart.products();
        let memo = match self.memo.take() {
            Some(memo) if Arc::ptr_eq(&memo.source, &snapshot) => memo,
            _ => {
                self.computations += 1;
                let summary = CartSummary::compute(&snapshot, self.currency);
                debug!(
                    total_items = summary.total_items,
                    total = %summary.formatted_total,
                    "Recomputed cart summary"
                );
                Memo {
                    source: snapshot,
                    summary,
                }
            }
        };

        &self.memo.insert(memo).summary
    }

    /// Button caption, e.g. `3 itens`.
    pub fn button_text(&mut self) -> String {
        format!("{} itens", self.summary().total_items)
    }

    /// Formatted total price, e.g. `R$ 20,00`.
    pub fn total_text(&mut self) -> String {
        self.summary().formatted_total.clone()
    }

    /// Handle a tap: open the cart screen unless the cart is empty.
    ///
    /// Returns whether navigation happened.
    pub fn press(&mut self, navigator: &mut impl Navigator) -> bool {
        if self.summary().total_items == 0 {
            debug!("Cart is empty, ignoring tap");
            return false;
        }

        navigator.navigate(Route::Cart);
        true
    }

    /// How many times the summary has been computed.
    #[must_use]
    pub const fn computations(&self) -> usize {
        self.computations
    }
}
