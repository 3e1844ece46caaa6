//! Home page route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use boutique_core::Category;

use crate::catalog::ProductSearch;
use crate::error::Result;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Home page: the category menu and every active product.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub categories: Vec<Category>,
    pub products: Vec<ProductView>,
}

/// Home page handler.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeView>> {
    let categories = state.catalog().categories().await?;
    let products = state.catalog().search(&ProductSearch::default()).await?;

    Ok(Json(HomeView {
        categories,
        products: products.iter().map(ProductView::from).collect(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{get, test_app};

    #[tokio::test]
    async fn test_home_lists_categories_in_order() {
        let app = test_app();
        let response = get(&app, "/", None).await;
        assert_eq!(response.status, StatusCode::OK);

        let home = response.json();
        assert_eq!(home["categories"][0]["name"], "Cuisine");
        assert_eq!(home["categories"][1]["name"], "Maison");
        assert_eq!(home["products"].as_array().unwrap().len(), 3);
    }
}
