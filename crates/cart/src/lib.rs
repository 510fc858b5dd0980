//! GoMarketplace Cart library.
//!
//! This crate provides the shopping cart as a library: a persistent state
//! container, the consumer interface presentation code uses to reach it,
//! and the floating cart summary widget.
//!
//! # Architecture
//!
//! - [`CartProvider`] owns the line items and writes them through to a
//!   [`KeyValueStore`] after every change
//! - [`use_cart`] hands out a [`Cart`] handle inside a provider scope
//! - [`FloatingCart`] derives the item count and total price and opens the
//!   cart screen through a [`Navigator`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use go_marketplace_cart::{CartProvider, FloatingCart, FileStore, use_cart};
//!
//! let store = Arc::new(FileStore::new(config.storage_dir.clone()));
//! let provider = CartProvider::mount(store, config.storage_key()).await;
//!
//! provider.scope(async {
//!     let cart = use_cart()?;
//!     cart.add_to_cart(item).await?;
//!
//!     let mut widget = FloatingCart::mount(config.currency)?;
//!     widget.press(&mut router);
//!     Ok::<_, CartError>(())
//! }).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod floating_cart;
pub mod navigation;
pub mod provider;
pub mod storage;

pub use config::{CartConfig, ConfigError};
pub use context::{Cart, use_cart};
pub use error::CartError;
pub use floating_cart::{CartSummary, FloatingCart};
pub use navigation::{Navigator, Route};
pub use provider::{CartProvider, Hydration, Snapshot};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
