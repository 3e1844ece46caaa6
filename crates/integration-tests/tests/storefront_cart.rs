//! Cart flow against a running storefront.
//!
//! These tests require:
//! - A running `PostgreSQL` database with at least one active product
//! - The storefront running (cargo run -p boutique-storefront)
//!
//! Run with: cargo test -p boutique-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use boutique_integration_tests::{Visitor, test_product_id};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_health() {
    let visitor = Visitor::new();
    let response = visitor.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = visitor.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_add_remove_delete_flow() {
    let visitor = Visitor::new();
    let id = test_product_id();

    // Redirects land on the cart view
    let response = visitor.get(&format!("/add/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.url().path().ends_with("/cart"));

    visitor.get(&format!("/add/{id}")).await;
    assert_eq!(visitor.cart_count().await, 2);

    visitor.get(&format!("/cart/remove/{id}")).await;
    assert_eq!(visitor.cart_count().await, 1);

    let cart = visitor.get_json("/cart").await;
    assert_eq!(cart["items"][0]["product_id"], id);
    assert_eq!(cart["items"][0]["quantity"], 1);

    visitor.get(&format!("/cart/delete/{id}")).await;
    assert_eq!(visitor.cart_count().await, 0);
}

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_clear_and_isolation() {
    let first = Visitor::new();
    let second = Visitor::new();
    let id = test_product_id();

    first.get(&format!("/add/{id}")).await;
    assert_eq!(first.cart_count().await, 1);
    assert_eq!(second.cart_count().await, 0);

    first.get("/cart/delete").await;
    assert_eq!(first.cart_count().await, 0);
}

#[tokio::test]
#[ignore = "requires running storefront"]
async fn test_add_unknown_product() {
    let visitor = Visitor::new();
    let response = visitor.get(&format!("/add/{}", i32::MAX)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(visitor.cart_count().await, 0);
}
