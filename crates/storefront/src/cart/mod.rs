//! Request-scoped cart store.
//!
//! [`CartStore`] is the per-request handle on the visitor's cart. It is
//! extracted from the request (loading the cart from the session), mutated by
//! the handler, and written back with [`CartStore::save`] before the response
//! is built. The session layer persists the session when the response leaves.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn add(mut cart: CartStore, Path(id): Path<ProductId>) -> Result<Redirect> {
//!     cart.add(id);
//!     cart.save().await?;
//!     Ok(Redirect::to("/cart"))
//! }
//! ```

pub mod session;

use axum::{extract::FromRequestParts, http::request::Parts};
use thiserror::Error;
use tower_sessions::Session;
use tracing::warn;

use boutique_core::{Cart, CurrencyCode, FullCart, PriceError, ProductId};

use crate::catalog::ProductCatalog;
use crate::db::RepositoryError;
use crate::error::AppError;

pub use session::{CART_KEY, CartSession};

/// Errors raised while loading, saving or pricing a cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The session backend failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The cart could not be encoded for the session.
    #[error("cart encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The catalog could not be queried.
    #[error("catalog error: {0}")]
    Catalog(#[from] RepositoryError),

    /// Line totals could not be computed.
    #[error("price error: {0}")]
    Price(#[from] PriceError),
}

/// The visitor's cart for the duration of one request.
pub struct CartStore<S = Session> {
    session: S,
    cart: Cart,
    changed: bool,
}

impl<S: CartSession> CartStore<S> {
    /// Load the cart from `session`.
    ///
    /// A missing cart is an empty cart. A stored value that no longer
    /// decodes is removed from the session right away, whatever the request
    /// goes on to do.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be read, or if an
    /// unreadable cart cannot be removed.
    pub async fn load(session: S) -> Result<Self, CartError> {
        let cart = match session.get(CART_KEY).await? {
            None => Cart::new(),
            Some(value) => match serde_json::from_value::<Cart>(value) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(error = %e, "discarding unreadable cart from session");
                    session.remove(CART_KEY).await?;
                    Cart::new()
                }
            },
        };

        Ok(Self {
            session,
            cart,
            changed: false,
        })
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of a product. Returns the new quantity.
    pub fn add(&mut self, product_id: ProductId) -> u32 {
        self.changed = true;
        self.cart.add(product_id)
    }

    /// Take one unit of a product out; the line goes away at zero.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let removed = self.cart.remove(product_id);
        self.changed |= removed;
        removed
    }

    /// Drop a product's line entirely.
    pub fn delete(&mut self, product_id: ProductId) -> bool {
        let deleted = self.cart.delete(product_id);
        self.changed |= deleted;
        deleted
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.changed |= !self.cart.is_empty();
        self.cart.clear();
    }

    /// Write the cart back to the session.
    ///
    /// An empty cart removes the session key. Nothing is written when the
    /// cart did not change.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session cannot be written.
    pub async fn save(self) -> Result<Cart, CartError> {
        if !self.changed {
            return Ok(self.cart);
        }

        if self.cart.is_empty() {
            self.session.remove(CART_KEY).await?;
        } else {
            let value = serde_json::to_value(&self.cart)?;
            self.session.set(CART_KEY, value).await?;
        }

        Ok(self.cart)
    }

    /// Price the cart against the catalog.
    ///
    /// Products the catalog no longer returns are skipped and logged.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Catalog` if the catalog fails and
    /// `CartError::Price` if totals cannot be computed.
    pub async fn full(
        &self,
        catalog: &dyn ProductCatalog,
        currency: CurrencyCode,
    ) -> Result<FullCart, CartError> {
        if self.cart.is_empty() {
            return Ok(FullCart::empty(currency));
        }

        let products = catalog.find_by_ids(&self.cart.product_ids()).await?;
        let full = self
            .cart
            .resolve(currency, |id| products.iter().find(|p| p.id == id))?;

        if !full.missing.is_empty() {
            warn!(
                missing = ?full.missing,
                "cart references products missing from the catalog"
            );
        }

        Ok(full)
    }
}

impl<St> FromRequestParts<St> for CartStore<Session>
where
    St: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))?;

        Ok(Self::load(session).await?)
    }
}
