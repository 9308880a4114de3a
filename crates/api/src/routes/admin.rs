//! Back-office endpoints: catalog upkeep, stock and order fulfilment.
//!
//! Every handler takes [`AdminAccess`], so a request without the configured
//! token never reaches a service.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{BrandId, CategoryId, OrderId, ProductId, VariantId};
use document_store::DocumentStore;
use domain::{Brand, Category, DeliveryStatus, DomainError, NewProduct, Order, Product};
use serde::{Deserialize, Serialize};

use super::invalid_id;
use crate::error::ApiError;
use crate::extract::AdminAccess;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBrandRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingRequest {
    pub listed: bool,
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

#[derive(Serialize)]
pub struct CategoryBody {
    pub category: Category,
}

#[derive(Serialize)]
pub struct BrandBody {
    pub brand: Brand,
}

#[derive(Serialize)]
pub struct ProductBody {
    pub product: Product,
}

#[derive(Serialize)]
pub struct OrderBody {
    pub order: Order,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

// -- Categories and brands --

/// POST /admin/categories
#[tracing::instrument(skip(state, _admin, req))]
pub async fn create_category<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Envelope<CategoryBody>>), ApiError> {
    let category = state
        .catalog
        .create_category(&req.name, &req.description)
        .await?;
    Ok((StatusCode::CREATED, ok(CategoryBody { category })))
}

/// PATCH /admin/categories/{id}
#[tracing::instrument(skip(state, _admin, req))]
pub async fn set_category_listed<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ListingRequest>,
) -> Result<Json<Envelope<CategoryBody>>, ApiError> {
    let id = CategoryId::parse(&id).map_err(invalid_id)?;
    let category = state.catalog.set_category_listed(id, req.listed).await?;
    Ok(ok(CategoryBody { category }))
}

/// DELETE /admin/categories/{id}: soft delete.
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_category<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<MessageBody>>, ApiError> {
    let id = CategoryId::parse(&id).map_err(invalid_id)?;
    state.catalog.delete_category(id).await?;
    Ok(ok(MessageBody {
        message: "Category deleted",
    }))
}

/// POST /admin/brands
#[tracing::instrument(skip(state, _admin, req))]
pub async fn create_brand<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateBrandRequest>,
) -> Result<(StatusCode, Json<Envelope<BrandBody>>), ApiError> {
    let brand = state.catalog.create_brand(&req.name).await?;
    Ok((StatusCode::CREATED, ok(BrandBody { brand })))
}

/// PATCH /admin/brands/{id}
#[tracing::instrument(skip(state, _admin, req))]
pub async fn set_brand_listed<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ListingRequest>,
) -> Result<Json<Envelope<BrandBody>>, ApiError> {
    let id = BrandId::parse(&id).map_err(invalid_id)?;
    let brand = state.catalog.set_brand_listed(id, req.listed).await?;
    Ok(ok(BrandBody { brand }))
}

/// DELETE /admin/brands/{id}: soft delete.
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_brand<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<MessageBody>>, ApiError> {
    let id = BrandId::parse(&id).map_err(invalid_id)?;
    state.catalog.delete_brand(id).await?;
    Ok(ok(MessageBody {
        message: "Brand deleted",
    }))
}

// -- Products --

/// POST /admin/products
#[tracing::instrument(skip(state, _admin, req))]
pub async fn create_product<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Envelope<ProductBody>>), ApiError> {
    let product = state.catalog.create_product(req).await?;
    Ok((StatusCode::CREATED, ok(ProductBody { product })))
}

/// PATCH /admin/products/{id}
#[tracing::instrument(skip(state, _admin, req))]
pub async fn set_product_listed<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ListingRequest>,
) -> Result<Json<Envelope<ProductBody>>, ApiError> {
    let id = ProductId::parse(&id).map_err(invalid_id)?;
    let product = state.catalog.set_product_listed(id, req.listed).await?;
    Ok(ok(ProductBody { product }))
}

/// DELETE /admin/products/{id}: soft delete.
#[tracing::instrument(skip(state, _admin))]
pub async fn delete_product<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<MessageBody>>, ApiError> {
    let id = ProductId::parse(&id).map_err(invalid_id)?;
    state.catalog.delete_product(id).await?;
    Ok(ok(MessageBody {
        message: "Product deleted",
    }))
}

/// PUT /admin/products/{id}/stock: stock of a product sold without variants.
#[tracing::instrument(skip(state, _admin))]
pub async fn set_product_stock<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<StockRequest>,
) -> Result<Json<Envelope<ProductBody>>, ApiError> {
    let id = ProductId::parse(&id).map_err(invalid_id)?;
    let product = state
        .catalog
        .set_product_quantity(id, req.quantity)
        .await?;
    Ok(ok(ProductBody { product }))
}

/// PUT /admin/products/{id}/variants/{variant_id}/stock
#[tracing::instrument(skip(state, _admin))]
pub async fn set_variant_stock<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path((id, variant_id)): Path<(String, String)>,
    Json(req): Json<StockRequest>,
) -> Result<Json<Envelope<ProductBody>>, ApiError> {
    let id = ProductId::parse(&id).map_err(invalid_id)?;
    let variant_id = VariantId::parse(&variant_id).map_err(invalid_id)?;
    let product = state
        .catalog
        .set_variant_quantity(id, variant_id, req.quantity)
        .await?;
    Ok(ok(ProductBody { product }))
}

// -- Orders --

/// POST /admin/orders/{id}/status: move an order along the delivery path.
#[tracing::instrument(skip(state, _admin, req))]
pub async fn set_order_status<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Envelope<OrderBody>>, ApiError> {
    let id = OrderId::parse(&id).map_err(invalid_id)?;
    let status: DeliveryStatus = req.status.parse().map_err(DomainError::from)?;
    let order = state.orders.advance_delivery(id, status).await?;
    Ok(ok(OrderBody { order }))
}

/// POST /admin/orders/{id}/approve-return
#[tracing::instrument(skip(state, _admin))]
pub async fn approve_return<S: DocumentStore + Clone + 'static>(
    _admin: AdminAccess,
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<OrderBody>>, ApiError> {
    let id = OrderId::parse(&id).map_err(invalid_id)?;
    let order = state.orders.approve_return(id).await?;
    Ok(ok(OrderBody { order }))
}
