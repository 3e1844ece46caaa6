//! Product route handlers.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use boutique_core::{CategoryId, CommentId, CommentThread, Product, ProductId, build_threads};

use crate::catalog::ProductSearch;
use crate::comments::NewCommentForm;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Product as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub category_id: CategoryId,
    pub url: String,
    pub add_to_cart_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            image: product.image.clone(),
            category_id: product.category_id,
            url: format!("/products/{}", product.slug),
            add_to_cart_url: format!("/add/{}", product.id),
        }
    }
}

/// A comment and its replies. The author's email is never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub nickname: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentView>,
}

impl From<CommentThread> for CommentView {
    fn from(thread: CommentThread) -> Self {
        Self {
            id: thread.comment.id,
            nickname: thread.comment.nickname,
            content: thread.comment.content,
            created_at: thread.comment.created_at,
            replies: thread.replies.into_iter().map(Self::from).collect(),
        }
    }
}

/// Product listing.
#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub products: Vec<ProductView>,
    pub query: Option<String>,
    pub category: Option<CategoryId>,
}

/// Product page.
#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    pub product: ProductView,
    pub comments: Vec<CommentView>,
}

/// Listing filters.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<CategoryId>,
}

/// Product listing with optional name and category filters.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> Result<Json<ProductListView>> {
    let query = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let search = ProductSearch {
        query: query.clone(),
        category_ids: params.category.into_iter().collect(),
    };
    let products = state.catalog().search(&search).await?;

    Ok(Json(ProductListView {
        products: products.iter().map(ProductView::from).collect(),
        query,
        category: params.category,
    }))
}

/// Product detail. Unknown slugs redirect to the listing.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let Some(product) = state.catalog().find_by_slug(&slug).await? else {
        return Ok(Redirect::to("/products").into_response());
    };

    let comments = state.comments().list_for_product(product.id).await?;
    let comments = build_threads(comments)
        .into_iter()
        .map(CommentView::from)
        .collect();

    Ok(Json(ProductDetailView {
        product: ProductView::from(&product),
        comments,
    })
    .into_response())
}

/// Post a comment on a product, then go back to the product page.
#[instrument(skip(state, form))]
pub async fn create_comment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<NewCommentForm>,
) -> Result<Redirect> {
    let product = state
        .catalog()
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let comment = form.validate(product.id)?;
    let stored = state.comments().create(comment).await?;

    let comment_id = stored.id.to_string();
    add_breadcrumb(
        "comments",
        "Posted comment",
        Some(&[("comment_id", &comment_id), ("product", &slug)]),
    );

    Ok(Redirect::to(&format!("/products/{slug}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{Visitor, get, test_app};

    const COMMENT: &str = "email=client%40boutique.fr&nickname=Camille&content=Superbe&rgpd=on";

    #[tokio::test]
    async fn test_index_lists_active_products() {
        let app = test_app();
        let list = get(&app, "/products", None).await.json();

        let names: Vec<&str> = list["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Bol Rouge", "Lampe Verte", "Tasse Bleue"]);
    }

    #[tokio::test]
    async fn test_index_filters() {
        let app = test_app();

        let list = get(&app, "/products?q=TASSE", None).await.json();
        assert_eq!(list["products"].as_array().unwrap().len(), 1);
        assert_eq!(list["products"][0]["add_to_cart_url"], "/add/1");
        assert_eq!(list["query"], "TASSE");

        let list = get(&app, "/products?category=2", None).await.json();
        assert_eq!(list["products"].as_array().unwrap().len(), 1);
        assert_eq!(list["products"][0]["slug"], "lampe-verte");

        let list = get(&app, "/products?q=%20%20", None).await.json();
        assert_eq!(list["query"], json!(null));
        assert_eq!(list["products"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_show_product() {
        let app = test_app();
        let response = get(&app, "/products/bol-rouge", None).await;
        assert_eq!(response.status, StatusCode::OK);

        let detail = response.json();
        assert_eq!(detail["product"]["price"], "8.00 €");
        assert_eq!(detail["comments"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_slug_redirects_to_listing() {
        let app = test_app();
        let response = get(&app, "/products/nope", None).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location.as_deref(), Some("/products"));

        // Inactive
        let response = get(&app, "/products/vase-ancien", None).await;
        assert_eq!(response.location.as_deref(), Some("/products"));
    }

    #[tokio::test]
    async fn test_comment_thread() {
        let app = test_app();
        let mut visitor = Visitor::new(&app);

        let response = visitor
            .post_form("/products/tasse-bleue/comments", COMMENT)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location.as_deref(), Some("/products/tasse-bleue"));

        let reply = format!("{COMMENT}&parent_id=1");
        visitor
            .post_form("/products/tasse-bleue/comments", &reply)
            .await;

        let detail = visitor.get("/products/tasse-bleue").await.json();
        let comments = detail["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["nickname"], "Camille");
        assert_eq!(comments[0]["replies"].as_array().unwrap().len(), 1);
        assert!(comments[0].get("email").is_none());
    }

    #[tokio::test]
    async fn test_comment_rejections() {
        let app = test_app();
        let mut visitor = Visitor::new(&app);

        let without_consent = "email=client%40boutique.fr&nickname=Camille&content=Superbe";
        let response = visitor
            .post_form("/products/tasse-bleue/comments", without_consent)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        let response = visitor
            .post_form("/products/nope/comments", COMMENT)
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
