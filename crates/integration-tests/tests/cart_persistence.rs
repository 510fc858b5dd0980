//! Integration tests for cart persistence.
//!
//! These tests run the cart against the file store, simulating app
//! restarts by mounting a fresh provider over the same directory.

#![allow(clippy::unwrap_used)]

use go_marketplace_cart::{CartConfig, CartProvider, FileStore, Hydration, KeyValueStore};
use go_marketplace_core::{Change, LineItems};
use go_marketplace_integration_tests::{TestCart, id, product};
use rust_decimal::Decimal;

// =============================================================================
// Restart Tests
// =============================================================================

#[tokio::test]
async fn test_first_launch_starts_empty() {
    let test = TestCart::new();
    let cart = test.launch().await;

    assert_eq!(cart.hydration(), Some(Hydration::Empty));
    assert!(cart.products().is_empty());
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let test = TestCart::new();

    let cart = test.launch().await;
    cart.add_to_cart(product("A", 10)).await.unwrap();
    cart.add_to_cart(product("B", 4)).await.unwrap();
    cart.add_to_cart(product("A", 10)).await.unwrap();
    let before = cart.products();
    drop(cart);

    let cart = test.launch().await;
    assert_eq!(
        cart.hydration(),
        Some(Hydration::Restored { line_items: 2 })
    );
    assert_eq!(*cart.products(), *before);

    let order: Vec<String> = cart
        .products()
        .iter()
        .map(|item| item.id().to_string())
        .collect();
    assert_eq!(order, vec!["A", "B"]);
}

#[tokio::test]
async fn test_persisted_layout() {
    let test = TestCart::new();
    let cart = test.launch().await;
    cart.add_to_cart(product("A", 10)).await.unwrap();
    cart.increment(&id("A")).await;

    let path = test.store.path_for("@GoMarketPlace:products");
    let raw = tokio::fs::read_to_string(path).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(
        value,
        serde_json::json!([{
            "id": "A",
            "title": "Product A",
            "image_url": "https://cdn.example.com/A.png",
            "price": 10.0,
            "quantity": 2
        }])
    );
}

#[tokio::test]
async fn test_end_to_end_sequence_on_disk() {
    let test = TestCart::new();
    let cart = test.launch().await;
    let a = id("A");

    assert_eq!(cart.add_to_cart(product("A", 10)).await.unwrap(), Change::Added);
    assert_eq!(cart.increment(&a).await, Change::Incremented { quantity: 2 });
    assert_eq!(cart.products().total_price(), Decimal::from(20));
    assert_eq!(cart.products().total_quantity(), 2);

    assert_eq!(cart.decrement(&a).await, Change::Decremented { quantity: 1 });
    assert_eq!(cart.decrement(&a).await, Change::Removed);
    assert_eq!(cart.decrement(&a).await, Change::Unchanged);

    let restored = test.launch().await;
    assert_eq!(*restored.products(), LineItems::new());
}

#[tokio::test]
async fn test_prices_survive_restart() {
    let test = TestCart::new();
    let cart = test.launch().await;

    for (i, price) in ["0.3333333333333333333", "19.99", "0.1", "999999999999.99"]
        .iter()
        .enumerate()
    {
        let mut item = product(&format!("P{i}"), 0);
        item.price = price.parse().unwrap();
        cart.add_to_cart(item).await.unwrap();
    }
    let before = cart.products();

    let restored = test.launch().await;
    assert_eq!(*restored.products(), *before);
    assert_eq!(restored.products().total_price(), before.total_price());
    assert_eq!(
        restored.products().get(&id("P0")).unwrap().price(),
        "0.33".parse::<Decimal>().unwrap()
    );
}

// =============================================================================
// Malformed Data Tests
// =============================================================================

#[tokio::test]
async fn test_corrupt_file_starts_empty_and_recovers() {
    let test = TestCart::new();
    test.store
        .set(&test.config.storage_key(), "[{\"id\":")
        .await
        .unwrap();

    let cart = test.launch().await;
    assert_eq!(cart.hydration(), Some(Hydration::Malformed));
    assert!(cart.products().is_empty());

    // The next change overwrites the corrupt value.
    cart.add_to_cart(product("A", 1)).await.unwrap();
    let cart = test.launch().await;
    assert_eq!(
        cart.hydration(),
        Some(Hydration::Restored { line_items: 1 })
    );
}

#[tokio::test]
async fn test_out_of_range_price_starts_empty() {
    let test = TestCart::new();
    test.store
        .set(
            &test.config.storage_key(),
            r#"[{"id":"A","title":"t","image_url":"u","price":5e28,"quantity":2}]"#,
        )
        .await
        .unwrap();

    let cart = test.launch().await;
    assert_eq!(cart.hydration(), Some(Hydration::Malformed));
    assert_eq!(cart.products().total_price(), Decimal::ZERO);
}

#[tokio::test]
async fn test_namespaces_are_isolated() {
    let test = TestCart::new();
    let other = CartConfig {
        namespace: "@Other".to_string(),
        ..test.config.clone()
    };

    let main_cart = test.launch().await;
    main_cart.add_to_cart(product("A", 1)).await.unwrap();

    let other_cart = CartProvider::from_config(test.store.clone(), &other);
    assert_eq!(other_cart.initialize().await, Hydration::Empty);
}

#[tokio::test]
async fn test_clear_removes_file() {
    let test = TestCart::new();
    let cart = test.launch().await;
    cart.add_to_cart(product("A", 1)).await.unwrap();

    cart.clear().await.unwrap();

    let store = FileStore::new(test.dir.path());
    assert_eq!(store.get(&test.config.storage_key()).await.unwrap(), None);
    assert_eq!(test.launch().await.hydration(), Some(Hydration::Empty));
}
