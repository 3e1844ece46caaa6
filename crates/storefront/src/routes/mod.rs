//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Categories and products
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (catalog reachable)
//!
//! # Products
//! GET  /products?q=&category=     - Product search
//! GET  /products/{slug}           - Product detail with comment threads
//! POST /products/{slug}/comments  - Post a comment (form)
//!
//! # Cart (mutations redirect to /cart)
//! GET  /cart                      - Priced cart
//! GET  /cart/count                - Units in the cart
//! GET  /add/{id}                  - Add one unit
//! GET  /cart/remove/{id}          - Take one unit out
//! GET  /cart/remove?id=           - Same, id in the query string
//! GET  /cart/delete/{id}          - Drop the line
//! GET  /cart/delete               - Empty the cart
//! ```

pub mod cart;
pub mod health;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/comments", post(products::create_comment))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/remove", get(cart::remove_by_query))
        .route("/remove/{id}", get(cart::remove))
        .route("/delete", get(cart::clear))
        .route("/delete/{id}", get(cart::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .route("/add/{id}", get(cart::add))
        .nest("/cart", cart_routes())
}
