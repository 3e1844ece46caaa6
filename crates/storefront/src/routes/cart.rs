//! Cart route handlers.
//!
//! Every mutation redirects back to `/cart`. The cart itself lives in the
//! session as a product id to quantity map; see [`crate::cart`].

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use boutique_core::{CartItem, FullCart, ProductId};

use crate::cart::CartStore;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// One cart line as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// The priced cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
    pub currency: &'static str,
}

/// Product selected by query string, as in `/cart/remove?id=3`.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub id: ProductId,
}

/// Cart badge.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCountView {
    pub count: u64,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            slug: item.product.slug.clone(),
            image: item.product.image.clone(),
            quantity: item.quantity,
            unit_price: item.product.price.display(),
            line_total: item.line_total.display(),
        }
    }
}

impl From<&FullCart> for CartView {
    fn from(cart: &FullCart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            total: cart.total.display(),
            item_count: cart.item_count,
            currency: cart.total.currency_code.code(),
        }
    }
}

/// Display the cart.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, cart: CartStore) -> Result<Json<CartView>> {
    let full = cart
        .full(state.catalog(), state.config().currency)
        .await?;
    Ok(Json(CartView::from(&full)))
}

/// Units in the cart, as stored in the session.
#[instrument(skip(cart))]
pub async fn count(cart: CartStore) -> Json<CartCountView> {
    Json(CartCountView {
        count: cart.cart().item_count(),
    })
}

/// Add one unit of a product.
///
/// Unknown or inactive products are rejected with 404 and the cart is left
/// untouched.
#[instrument(skip(state, cart), fields(product_id = %id))]
pub async fn add(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    mut cart: CartStore,
) -> Result<Redirect> {
    let Some(product) = state.catalog().find_by_id(id).await? else {
        return Err(AppError::NotFound(format!("product {id}")));
    };

    let quantity = cart.add(product.id);
    cart.save().await?;

    let id_str = id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", &id_str)]));
    tracing::debug!(quantity, "product added to cart");

    Ok(Redirect::to("/cart"))
}

/// Take one unit of a product out of the cart.
#[instrument(skip(cart), fields(product_id = %id))]
pub async fn remove(Path(id): Path<ProductId>, cart: CartStore) -> Result<Redirect> {
    remove_one(id, cart).await
}

/// Same as [`remove`], with the product in the query string.
#[instrument(skip(cart), fields(product_id = %query.id))]
pub async fn remove_by_query(
    Query(query): Query<ProductQuery>,
    cart: CartStore,
) -> Result<Redirect> {
    remove_one(query.id, cart).await
}

async fn remove_one(id: ProductId, mut cart: CartStore) -> Result<Redirect> {
    if cart.remove(id) {
        cart.save().await?;
        let id_str = id.to_string();
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", &id_str)]));
    }
    Ok(Redirect::to("/cart"))
}

/// Drop a product's line from the cart.
#[instrument(skip(cart), fields(product_id = %id))]
pub async fn delete(Path(id): Path<ProductId>, mut cart: CartStore) -> Result<Redirect> {
    if cart.delete(id) {
        cart.save().await?;
        let id_str = id.to_string();
        add_breadcrumb("cart", "Deleted cart line", Some(&[("product_id", &id_str)]));
    }
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(mut cart: CartStore) -> Result<Redirect> {
    cart.clear();
    cart.save().await?;
    add_breadcrumb("cart", "Cleared cart", None);
    Ok(Redirect::to("/cart"))
}
