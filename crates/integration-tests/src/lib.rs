//! Integration tests for GoMarketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart state written to and restored from the file store
//! - `floating_cart` - Widget totals and navigation against a live cart
//!
//! Shared fixtures live in this crate so each test file stays focused.

use std::sync::Arc;

use go_marketplace_cart::{CartConfig, CartProvider, FileStore};
use go_marketplace_core::{NewLineItem, ProductId};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// A cart backed by a file store in a temporary directory.
pub struct TestCart {
    pub dir: TempDir,
    pub config: CartConfig,
    pub store: Arc<FileStore>,
}

impl TestCart {
    /// Create a fresh, empty storage directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = CartConfig {
            storage_dir: dir.path().to_path_buf(),
            ..CartConfig::default()
        };
        let store = Arc::new(FileStore::new(config.storage_dir.clone()));
        Self { dir, config, store }
    }

    /// Mount a provider over the shared store, as an app launch would.
    pub async fn launch(&self) -> CartProvider {
        CartProvider::mount(self.store.clone(), self.config.storage_key()).await
    }
}

impl Default for TestCart {
    fn default() -> Self {
        Self::new()
    }
}

/// A product with the given ID and whole-number price.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
pub fn product(id: &str, price: i64) -> NewLineItem {
    NewLineItem {
        id: ProductId::parse(id).expect("valid product id"),
        title: format!("Product {id}"),
        image_url: format!("https://cdn.example.com/{id}.png"),
        price: Decimal::from(price),
    }
}

/// Parse a product ID.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
pub fn id(id: &str) -> ProductId {
    ProductId::parse(id).expect("valid product id")
}
