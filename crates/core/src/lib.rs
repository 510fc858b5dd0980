//! GoMarketplace Core - Shared cart types library.
//!
//! This crate provides the domain types used across all GoMarketplace components:
//! - `cart` - Cart state container, storage backends, and the floating cart widget
//! - `cli` - Command-line driver for inspecting and editing a persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no storage,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, line items, and the line item collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
