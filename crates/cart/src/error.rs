//! Unified error handling with Sentry integration.
//!
//! Provides the `CartError` type returned by the cart's fallible operations,
//! plus breadcrumb helpers so Sentry reports show the cart actions leading
//! up to an error.

use go_marketplace_core::LineItemsError;
use thiserror::Error;

use crate::storage::StoreError;

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// The consumer interface was used with no enclosing cart provider.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,

    /// The line item cannot go into the cart.
    #[error("Invalid line item: {0}")]
    InvalidLineItem(#[from] LineItemsError),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// The persisted cart could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for a cart action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Incremented line item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        assert_eq!(
            CartError::OutsideProvider.to_string(),
            "use_cart must be used within a CartProvider"
        );

        let err = CartError::from(StoreError::Unavailable("disk full".to_string()));
        assert_eq!(err.to_string(), "Storage error: Storage unavailable: disk full");
    }

    #[test]
    fn test_add_breadcrumb_without_client() {
        // No Sentry client is bound in tests; recording must be a silent no-op.
        add_breadcrumb("cart", "Added line item", Some(&[("product_id", "A")]));
        add_breadcrumb("cart", "Cleared", None);
    }
}
