//! Catalog entities.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product as sold in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL segment used by `/products/{slug}`.
    pub slug: String,
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Image path relative to the upload directory.
    pub image: Option<String>,
    pub category_id: CategoryId,
    /// Inactive products are hidden from the catalog and cannot be added to a cart.
    pub active: bool,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Option<String>,
    /// Position in the home page listing, ascending.
    pub category_order: i32,
    pub parent_id: Option<CategoryId>,
}
