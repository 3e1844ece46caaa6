//! Caching decorator for any [`ProductCatalog`].
//!
//! Products by id and by slug, and the category list, are cached with `moka`.
//! Misses are never cached so a product created after a lookup shows up right
//! away. Searches always go to the inner catalog.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use boutique_core::{Category, Product, ProductId};
use moka::future::Cache;
use tracing::debug;

use super::{ProductCatalog, ProductSearch};
use crate::db::RepositoryError;

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Slug(String),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Categories(Vec<Category>),
}

/// A catalog that remembers recent lookups.
#[derive(Clone)]
pub struct CachedCatalog {
    inner: Arc<dyn ProductCatalog>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CachedCatalog {
    /// Wrap `inner`, keeping entries for `ttl`.
    #[must_use]
    pub fn new(inner: Arc<dyn ProductCatalog>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    async fn cached_product(&self, key: &CacheKey) -> Option<Product> {
        match self.cache.get(key).await {
            Some(CacheValue::Product(product)) => Some(*product),
            _ => None,
        }
    }

    async fn remember(&self, product: &Product) {
        let value = CacheValue::Product(Box::new(product.clone()));
        self.cache
            .insert(CacheKey::Product(product.id), value.clone())
            .await;
        self.cache
            .insert(CacheKey::Slug(product.slug.clone()), value)
            .await;
    }
}

#[async_trait]
impl ProductCatalog for CachedCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if let Some(product) = self.cached_product(&CacheKey::Product(id)).await {
            debug!(product_id = %id, "catalog cache hit");
            return Ok(Some(product));
        }

        let product = self.inner.find_by_id(id).await?;
        if let Some(product) = &product {
            self.remember(product).await;
        }
        Ok(product)
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let mut found = Vec::with_capacity(ids.len());
        let mut misses = Vec::new();
        for id in ids {
            match self.cached_product(&CacheKey::Product(*id)).await {
                Some(product) => found.push(product),
                None => misses.push(*id),
            }
        }

        if !misses.is_empty() {
            let fetched = self.inner.find_by_ids(&misses).await?;
            for product in &fetched {
                self.remember(product).await;
            }
            found.extend(fetched);
        }

        Ok(found)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let key = CacheKey::Slug(slug.to_string());
        if let Some(product) = self.cached_product(&key).await {
            return Ok(Some(product));
        }

        let product = self.inner.find_by_slug(slug).await?;
        if let Some(product) = &product {
            self.remember(product).await;
        }
        Ok(product)
    }

    async fn search(&self, search: &ProductSearch) -> Result<Vec<Product>, RepositoryError> {
        self.inner.search(search).await
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories = self.inner.categories().await?;
        self.cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        self.inner.health_check().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::catalog::fixtures;

    /// Counts calls that reach the wrapped catalog.
    struct Counting {
        inner: InMemoryCatalog,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProductCatalog for Counting {
        async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(id).await
        }

        async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_ids(ids).await
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_slug(slug).await
        }

        async fn search(&self, search: &ProductSearch) -> Result<Vec<Product>, RepositoryError> {
            self.inner.search(search).await
        }

        async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.categories().await
        }

        async fn health_check(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    fn cached() -> (Arc<Counting>, CachedCatalog) {
        let counting = Arc::new(Counting {
            inner: fixtures::catalog(),
            calls: AtomicUsize::new(0),
        });
        let cached = CachedCatalog::new(counting.clone(), Duration::from_secs(60));
        (counting, cached)
    }

    #[tokio::test]
    async fn test_find_by_id_hits_inner_once() {
        let (counting, cached) = cached();

        let first = cached.find_by_id(ProductId::new(1)).await.unwrap();
        let second = cached.find_by_id(ProductId::new(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_id_lookup_warms_slug() {
        let (counting, cached) = cached();

        cached.find_by_id(ProductId::new(2)).await.unwrap();
        let by_slug = cached.find_by_slug("bol-rouge").await.unwrap();

        assert_eq!(by_slug.map(|p| p.id), Some(ProductId::new(2)));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let (counting, cached) = cached();

        assert!(cached.find_by_id(ProductId::new(99)).await.unwrap().is_none());
        assert!(cached.find_by_id(ProductId::new(99)).await.unwrap().is_none());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_find_by_ids_fetches_only_misses() {
        let (counting, cached) = cached();

        cached.find_by_id(ProductId::new(1)).await.unwrap();
        let found = cached
            .find_by_ids(&[ProductId::new(1), ProductId::new(3)])
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);

        cached
            .find_by_ids(&[ProductId::new(1), ProductId::new(3)])
            .await
            .unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_categories_cached() {
        let (counting, cached) = cached();

        cached.categories().await.unwrap();
        cached.categories().await.unwrap();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }
}
