//! Cart commands.
//!
//! Every command mounts the cart from the file store, runs inside the
//! provider scope, and makes sure the final state reached the disk before
//! the process exits.
//!
//! # Environment Variables
//!
//! - `CART_STORAGE_DIR` - Directory for the file store
//! - `CART_STORAGE_NAMESPACE` - Storage key namespace
//! - `CART_CURRENCY` - Currency used for totals

use std::sync::Arc;

use go_marketplace_cart::{
    Cart, CartConfig, CartError, CartProvider, CartSummary, FileStore, FloatingCart, Hydration,
    Route, use_cart,
};
use go_marketplace_core::{Change, CurrencyCode, NewLineItem, Price, ProductId};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Mount the cart persisted under the configured directory and namespace.
pub async fn open(config: &CartConfig) -> CartProvider {
    let store = Arc::new(FileStore::new(config.storage_dir.clone()));
    let dir = store.dir().display().to_string();
    let provider = CartProvider::from_config(store, config);

    match provider.initialize().await {
        Hydration::Malformed | Hydration::Failed => {
            warn!(
                %dir,
                key = provider.storage_key(),
                "Persisted cart was unusable, starting empty"
            );
        }
        hydration => info!(%dir, key = provider.storage_key(), ?hydration, "Cart loaded"),
    }
    provider
}

/// Log every line item.
pub fn show(provider: &CartProvider, currency: CurrencyCode) {
    let products = provider.products();
    if products.is_empty() {
        info!("Cart is empty");
        return;
    }

    for item in products.iter() {
        info!(
            "  {} x{}  {}  ({} each)",
            item.id(),
            item.quantity(),
            item.title(),
            Price::new(item.price(), currency)
        );
    }
    info!("Total: {}", Price::new(products.total_price(), currency));
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the price is out of range or the cart cannot be
/// saved.
pub async fn add(
    provider: &CartProvider,
    id: ProductId,
    title: String,
    image_url: String,
    price: Decimal,
) -> Result<(), CommandError> {
    let item = NewLineItem {
        id,
        title,
        image_url,
        price,
    };

    mutate(provider, |cart| async move { cart.add_to_cart(item).await }).await
}

/// Add one unit of a product already in the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub async fn increment(provider: &CartProvider, id: &ProductId) -> Result<(), CommandError> {
    mutate(provider, |cart| async move { Ok(cart.increment(id).await) }).await
}

/// Remove one unit of a product.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub async fn decrement(provider: &CartProvider, id: &ProductId) -> Result<(), CommandError> {
    mutate(provider, |cart| async move { Ok(cart.decrement(id).await) }).await
}

/// Log the floating cart's caption and total.
///
/// # Errors
///
/// Returns an error if the widget cannot reach the cart.
pub fn summary(
    provider: &CartProvider,
    currency: CurrencyCode,
) -> Result<CartSummary, CommandError> {
    let mut widget = provider.sync_scope(|| FloatingCart::mount(currency))?;
    info!("{}  |  {}", widget.button_text(), widget.total_text());
    Ok(widget.summary().clone())
}

/// Simulate a tap on the floating cart. Returns the routes it navigated to.
///
/// # Errors
///
/// Returns an error if the widget cannot reach the cart.
pub fn tap(provider: &CartProvider, currency: CurrencyCode) -> Result<Vec<Route>, CommandError> {
    let mut widget = provider.sync_scope(|| FloatingCart::mount(currency))?;
    let mut routes: Vec<Route> = Vec::new();

    if widget.press(&mut routes) {
        for route in &routes {
            info!(%route, "Navigate");
        }
    } else {
        info!("Cart is empty, staying on the current screen");
    }
    Ok(routes)
}

async fn mutate<F, Fut>(provider: &CartProvider, op: F) -> Result<(), CommandError>
where
    F: FnOnce(Cart) -> Fut,
    Fut: std::future::Future<Output = Result<Change, CartError>>,
{
    let change = provider.scope(async move { op(use_cart()?).await }).await?;

    if change.is_mutation() {
        info!(?change, "Cart updated");
    } else {
        info!("Nothing to change");
    }

    // The process is about to exit, so a failed write cannot wait for the next change.
    provider.flush().await?;
    Ok(())
}
