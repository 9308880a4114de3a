//! Shopper cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CartItemId, ProductId, VariantId};
use document_store::DocumentStore;
use domain::{Cart, CartView};
use serde::{Deserialize, Serialize};

use super::invalid_id;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: CartView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutationResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<Cart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_count: Option<usize>,
}

impl CartMutationResponse {
    fn with_cart(message: &'static str, cart: Cart) -> Self {
        Self {
            success: true,
            message,
            cart_count: Some(cart.item_count()),
            cart: Some(cart),
        }
    }
}

// -- Handlers --

/// GET /cart: the caller's cart, empty when there is none.
#[tracing::instrument(skip(state, caller))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.get_cart(&caller).await?;
    Ok(Json(CartResponse {
        success: true,
        cart,
    }))
}

/// POST /cart/items: add a product, merging with an existing line.
#[tracing::instrument(skip(state, caller, req))]
pub async fn add_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartMutationResponse>, ApiError> {
    let product_id = ProductId::parse(&req.product_id).map_err(invalid_id)?;
    let variant_id = req
        .variant_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(VariantId::parse)
        .transpose()
        .map_err(invalid_id)?;

    let cart = state
        .carts
        .add_item(&caller, product_id, variant_id, req.quantity)
        .await?;
    Ok(Json(CartMutationResponse::with_cart(
        "Item added to cart",
        cart,
    )))
}

/// PATCH /cart/items/{id}: replace a line's quantity.
#[tracing::instrument(skip(state, caller, req))]
pub async fn update_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartMutationResponse>, ApiError> {
    let item_id = CartItemId::parse(&id).map_err(invalid_id)?;
    let cart = state
        .carts
        .update_item(&caller, item_id, req.quantity)
        .await?;
    Ok(Json(CartMutationResponse::with_cart("Cart updated", cart)))
}

/// DELETE /cart/items/{id}: remove a line.
#[tracing::instrument(skip(state, caller))]
pub async fn remove_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<CartMutationResponse>, ApiError> {
    let item_id = CartItemId::parse(&id).map_err(invalid_id)?;
    let cart = state.carts.remove_item(&caller, item_id).await?;
    Ok(Json(CartMutationResponse::with_cart(
        "Item removed from cart",
        cart,
    )))
}

/// DELETE /cart: empty the cart.
#[tracing::instrument(skip(state, caller))]
pub async fn clear<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
) -> Result<Json<CartMutationResponse>, ApiError> {
    state.carts.clear(&caller).await?;
    Ok(Json(CartMutationResponse {
        success: true,
        message: "Cart cleared",
        cart: None,
        cart_count: Some(0),
    }))
}
