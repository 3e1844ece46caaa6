//! Product catalog access.
//!
//! The catalog is the source of truth for product identity, name and price.
//! Handlers only see the [`ProductCatalog`] trait; the running server uses
//! [`PgCatalog`](crate::db::PgCatalog) wrapped in a [`CachedCatalog`].

mod cached;
mod memory;

use async_trait::async_trait;
use boutique_core::{Category, CategoryId, Product, ProductId};

use crate::db::RepositoryError;

pub use cached::CachedCatalog;
pub use memory::InMemoryCatalog;
#[cfg(test)]
pub(crate) use memory::fixtures;

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSearch {
    /// Case-insensitive substring of the product name.
    pub query: Option<String>,
    /// Restrict to these categories; empty means all.
    pub category_ids: Vec<CategoryId>,
}

impl ProductSearch {
    /// Whether `product` passes the filters.
    ///
    /// Mirrors the SQL used by the Postgres catalog.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let name_matches = self.query.as_deref().is_none_or(|query| {
            product
                .name
                .to_lowercase()
                .contains(&query.to_lowercase())
        });
        let category_matches =
            self.category_ids.is_empty() || self.category_ids.contains(&product.category_id);
        name_matches && category_matches
    }
}

/// Read access to the product catalog.
///
/// Only active products are visible through this trait: an inactive product
/// resolves to `None` exactly like a deleted one.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a product by id.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Look up several products at once. Unknown ids are left out.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Look up a product by its URL slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError>;

    /// Products matching `search`, ordered by name.
    async fn search(&self, search: &ProductSearch) -> Result<Vec<Product>, RepositoryError>;

    /// All categories ordered by `category_order`.
    async fn categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Verify the backing store is reachable.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}
