//! In-process catalog backed by a product list.

use async_trait::async_trait;
use boutique_core::{Category, Product, ProductId};

use super::{ProductCatalog, ProductSearch};
use crate::db::RepositoryError;

/// Catalog held entirely in memory.
///
/// Used by tests and for running the routes without a database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl InMemoryCatalog {
    /// Create a catalog from products and categories.
    #[must_use]
    pub fn new(products: Vec<Product>, mut categories: Vec<Category>) -> Self {
        categories.sort_by_key(|c| c.category_order);
        Self {
            products,
            categories,
        }
    }

    fn active(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.active().find(|p| p.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.active().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        Ok(self.active().find(|p| p.slug == slug).cloned())
    }

    async fn search(&self, search: &ProductSearch) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> =
            self.active().filter(|p| search.matches(p)).cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.categories.clone())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use boutique_core::CategoryId;

    use super::fixtures::catalog;
    use super::*;

    #[tokio::test]
    async fn test_inactive_products_are_hidden() {
        let catalog = catalog();
        assert!(catalog.find_by_id(ProductId::new(4)).await.unwrap().is_none());
        assert!(catalog.find_by_slug("vase-ancien").await.unwrap().is_none());
        assert_eq!(catalog.search(&ProductSearch::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let found = catalog()
            .find_by_ids(&[ProductId::new(1), ProductId::new(42), ProductId::new(3)])
            .await
            .unwrap();
        let ids: Vec<i32> = found.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_search_by_name_and_category() {
        let catalog = catalog();

        let by_name = catalog
            .search(&ProductSearch {
                query: Some("ROUGE".to_string()),
                category_ids: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].slug, "bol-rouge");

        let by_category = catalog
            .search(&ProductSearch {
                query: None,
                category_ids: vec![CategoryId::new(1)],
            })
            .await
            .unwrap();
        let names: Vec<&str> = by_category.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bol Rouge", "Tasse Bleue"]);
    }

    #[tokio::test]
    async fn test_categories_ordered() {
        let categories = catalog().categories().await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cuisine", "Maison"]);
    }
}
