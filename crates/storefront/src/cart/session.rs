//! Session storage seen by the cart.
//!
//! The cart only needs three operations on the visitor's session: read a
//! value, write a value, and remove a key. [`CartSession`] names exactly
//! those, so the cart works the same against `tower_sessions` and against
//! test doubles.

use async_trait::async_trait;
use serde_json::Value;
use tower_sessions::Session;

/// Session key holding the cart's product/quantity map.
pub const CART_KEY: &str = "cart";

/// Key/value storage scoped to one visitor.
#[async_trait]
pub trait CartSession: Send + Sync {
    /// Read the value under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, tower_sessions::session::Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), tower_sessions::session::Error>;

    /// Remove `key`.
    async fn remove(&self, key: &str) -> Result<(), tower_sessions::session::Error>;
}

#[async_trait]
impl CartSession for Session {
    async fn get(&self, key: &str) -> Result<Option<Value>, tower_sessions::session::Error> {
        self.get_value(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), tower_sessions::session::Error> {
        self.insert_value(key, value).await.map(|_| ())
    }

    async fn remove(&self, key: &str) -> Result<(), tower_sessions::session::Error> {
        self.remove_value(key).await.map(|_| ())
    }
}
