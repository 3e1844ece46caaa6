//! Integration tests for the Boutique storefront.
//!
//! These run against a live storefront and are ignored by default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p boutique-storefront &
//! cargo test -p boutique-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - storefront under test (default: `http://localhost:3000`)
//! - `STOREFRONT_TEST_PRODUCT_ID` - an active product id (default: 1)

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Id of a product known to be active in the test database.
#[must_use]
pub fn test_product_id() -> i32 {
    std::env::var("STOREFRONT_TEST_PRODUCT_ID")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1)
}

/// A visitor with its own cookie jar, so its own session and cart.
pub struct Visitor {
    client: Client,
    base_url: String,
}

impl Visitor {
    /// Create a visitor that follows redirects and keeps cookies.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: storefront_base_url(),
        }
    }

    /// GET `path`, following redirects.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("Request failed")
    }

    /// GET `path` and decode the JSON body, asserting a 200.
    ///
    /// # Panics
    ///
    /// Panics if the request fails, the status is not 200 or the body is not JSON.
    pub async fn get_json(&self, path: &str) -> Value {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.json().await.expect("Invalid JSON body")
    }

    /// Units currently in the cart.
    ///
    /// # Panics
    ///
    /// Panics if `/cart/count` does not answer with a count.
    pub async fn cart_count(&self) -> u64 {
        self.get_json("/cart/count").await["count"]
            .as_u64()
            .expect("count missing")
    }
}

impl Default for Visitor {
    fn default() -> Self {
        Self::new()
    }
}
