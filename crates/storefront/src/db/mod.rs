//! Database operations for the storefront `PostgreSQL`.
//!
//! ## Tables
//!
//! - `categories` - `id`, `name`, `slug`, `category_order`, `parent_id`
//! - `products` - `id`, `name`, `slug`, `description`, `price NUMERIC`, `image`,
//!   `category_id`, `active`
//! - `comments` - `id`, `product_id`, `parent_id`, `email`, `nickname`, `content`,
//!   `created_at TIMESTAMPTZ`
//! - `tower_sessions.session` - created by the session store itself on startup
//!
//! The catalog schema is owned outside this service; these repositories only
//! read products and categories, and insert comments.

pub mod comments;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use comments::PgCommentRepository;
pub use products::PgCatalog;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
