//! Shopper-facing catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ProductId;
use document_store::DocumentStore;
use domain::{Brand, Category, DomainError, Product};
use serde::Serialize;

use super::invalid_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[derive(Serialize)]
pub struct TaxonomyResponse {
    pub success: bool,
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
}

/// GET /products: every product a shopper can buy.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.catalog.list_available_products().await?;
    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}

/// GET /products/{id}: unlisted and deleted products are not found.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = ProductId::parse(&id).map_err(invalid_id)?;
    let product = state
        .catalog
        .find_available_product(product_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Product", product_id))?;
    Ok(Json(ProductResponse {
        success: true,
        product: product.into_product(),
    }))
}

/// GET /taxonomy: listed categories and brands.
#[tracing::instrument(skip(state))]
pub async fn taxonomy<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<TaxonomyResponse>, ApiError> {
    let categories = state
        .catalog
        .list_categories()
        .await?
        .into_iter()
        .filter(Category::is_active)
        .collect();
    let brands = state
        .catalog
        .list_brands()
        .await?
        .into_iter()
        .filter(Brand::is_active)
        .collect();
    Ok(Json(TaxonomyResponse {
        success: true,
        categories,
        brands,
    }))
}
