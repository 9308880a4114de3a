//! Checkout and order history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{CheckoutReceipt, CheckoutRequest};
use common::OrderId;
use document_store::DocumentStore;
use domain::Order;
use serde::Serialize;

use super::invalid_id;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub receipt: CheckoutReceipt,
}

#[derive(Serialize)]
pub struct OrderListResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Order,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderActionResponse {
    pub success: bool,
    pub message: &'static str,
    pub order_id: OrderId,
    pub delivery_status: String,
}

impl OrderActionResponse {
    fn new(message: &'static str, order: &Order) -> Self {
        Self {
            success: true,
            message,
            order_id: order.id(),
            delivery_status: order.delivery_status().to_string(),
        }
    }
}

// -- Handlers --

/// POST /checkout: turn the caller's cart into an order.
#[tracing::instrument(skip(state, caller, req))]
pub async fn checkout<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let receipt = state.checkout.process_checkout(&caller, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            success: true,
            message: "Order placed successfully",
            receipt,
        }),
    ))
}

/// GET /orders: the caller's orders, newest first.
#[tracing::instrument(skip(state, caller))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = state.orders.list_orders(&caller).await?;
    Ok(Json(OrderListResponse {
        success: true,
        orders,
    }))
}

/// GET /orders/{id}: one of the caller's orders.
#[tracing::instrument(skip(state, caller))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::parse(&id).map_err(invalid_id)?;
    let order = state.orders.get_order(&caller, order_id).await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// POST /orders/{id}/cancel
#[tracing::instrument(skip(state, caller))]
pub async fn cancel<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<OrderActionResponse>, ApiError> {
    let order_id = OrderId::parse(&id).map_err(invalid_id)?;
    let order = state.orders.cancel_order(&caller, order_id).await?;
    Ok(Json(OrderActionResponse::new(
        "Order cancelled successfully",
        &order,
    )))
}

/// POST /orders/{id}/return
#[tracing::instrument(skip(state, caller))]
pub async fn request_return<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> Result<Json<OrderActionResponse>, ApiError> {
    let order_id = OrderId::parse(&id).map_err(invalid_id)?;
    let order = state.orders.request_return(&caller, order_id).await?;
    Ok(Json(OrderActionResponse::new(
        "Return requested successfully",
        &order,
    )))
}
