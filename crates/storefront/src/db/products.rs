//! Product and category queries.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use boutique_core::{Category, CategoryId, CurrencyCode, Price, Product, ProductId};

use super::RepositoryError;
use crate::catalog::{ProductCatalog, ProductSearch};

const PRODUCT_COLUMNS: &str =
    "id, name, slug, description, price, image, category_id, active";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: Option<String>,
    price: Decimal,
    image: Option<String>,
    category_id: CategoryId,
    active: bool,
}

impl ProductRow {
    fn into_product(self, currency: CurrencyCode) -> Result<Product, RepositoryError> {
        if self.price.is_sign_negative() {
            return Err(RepositoryError::DataCorruption(format!(
                "product {} has negative price {}",
                self.id, self.price
            )));
        }

        Ok(Product {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description.unwrap_or_default(),
            price: Price::new(self.price, currency),
            image: self.image,
            category_id: self.category_id,
            active: self.active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    slug: Option<String>,
    category_order: i32,
    parent_id: Option<CategoryId>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            category_order: row.category_order,
            parent_id: row.parent_id,
        }
    }
}

/// Catalog backed by the `products` and `categories` tables.
///
/// Prices are stored as bare `NUMERIC` amounts in the store currency.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
    currency: CurrencyCode,
}

impl PgCatalog {
    /// Create a catalog reading prices in `currency`.
    #[must_use]
    pub const fn new(pool: PgPool, currency: CurrencyCode) -> Self {
        Self { pool, currency }
    }

    fn convert(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        rows.into_iter()
            .map(|row| row.into_product(self.currency))
            .collect()
    }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND active"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_product(self.currency)).transpose()
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) AND active"
        ))
        .bind(raw)
        .fetch_all(&self.pool)
        .await?;

        self.convert(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1 AND active"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_product(self.currency)).transpose()
    }

    async fn search(&self, search: &ProductSearch) -> Result<Vec<Product>, RepositoryError> {
        let pattern = search
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)));
        let categories: Vec<i32> = search.category_ids.iter().map(CategoryId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE active
              AND ($1::text IS NULL OR name ILIKE $1)
              AND (cardinality($2::int4[]) = 0 OR category_id = ANY($2))
            ORDER BY name
            "
        ))
        .bind(pattern)
        .bind(categories)
        .fetch_all(&self.pool)
        .await?;

        self.convert(rows)
    }

    async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug, category_order, parent_id
            FROM categories
            ORDER BY category_order ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Escape `ILIKE` wildcards in user input.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
