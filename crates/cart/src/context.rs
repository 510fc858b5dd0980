//! Consumer interface for presentation code.
//!
//! A [`CartProvider`] establishes a scope with [`CartProvider::scope`] (or
//! [`CartProvider::sync_scope`]). Anything running inside that scope calls
//! [`use_cart`] to reach the cart without threading the provider through
//! every function. Calling [`use_cart`] outside any scope is a programming
//! error and returns [`CartError::OutsideProvider`].
//!
//! The scope is task-local: a task started with `tokio::spawn` does not
//! inherit it and must enter its own.

use std::future::Future;

use go_marketplace_core::{Change, NewLineItem, ProductId};
use tokio::sync::watch;

use crate::error::{CartError, Result};
use crate::provider::{CartProvider, Snapshot};

tokio::task_local! {
    static CURRENT_CART: CartProvider;
}

impl CartProvider {
    /// Run `f` with this cart reachable through [`use_cart`].
    pub async fn scope<F: Future>(&self, f: F) -> F::Output {
        CURRENT_CART.scope(self.clone(), f).await
    }

    /// Synchronous variant of [`scope`](Self::scope).
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(self.clone(), f)
    }
}

/// Get the cart of the enclosing provider scope.
///
/// # Errors
///
/// Returns [`CartError::OutsideProvider`] when called outside
/// [`CartProvider::scope`].
pub fn use_cart() -> Result<Cart> {
    CURRENT_CART
        .try_with(|provider| Cart {
            provider: provider.clone(),
        })
        .map_err(|_| CartError::OutsideProvider)
}

/// Handle exposing the cart's line items and operations.
#[derive(Debug, Clone)]
pub struct Cart {
    provider: CartProvider,
}

impl Cart {
    #[must_use]
    pub fn products(&self) -> Snapshot {
        self.provider.products()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.provider.subscribe()
    }

    /// # Errors
    ///
    /// See [`CartProvider::add_to_cart`].
    pub async fn add_to_cart(&self, item: NewLineItem) -> Result<Change> {
        self.provider.add_to_cart(item).await
    }

    pub async fn increment(&self, id: &ProductId) -> Change {
        self.provider.increment(id).await
    }

    pub async fn decrement(&self, id: &ProductId) -> Change {
        self.provider.decrement(id).await
    }
}
