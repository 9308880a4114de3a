//! HTTP API for the storefront.
//!
//! Exposes the cart, checkout and order history to shoppers, and an
//! optional token-guarded back office, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use document_store::DocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// The `/admin` routes are only mounted when the state carries an admin token.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    let mut router = Router::new()
        .route("/health", get(routes::system::health))
        .route("/products", get(routes::products::list::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/taxonomy", get(routes::products::taxonomy::<S>))
        .route(
            "/cart",
            get(routes::cart::get::<S>).delete(routes::cart::clear::<S>),
        )
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/cart/items/{id}",
            patch(routes::cart::update_item::<S>).delete(routes::cart::remove_item::<S>),
        )
        .route("/checkout", post(routes::orders::checkout::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S>))
        .route(
            "/orders/{id}/return",
            post(routes::orders::request_return::<S>),
        );

    if state.admin_token.is_some() {
        router = router.nest("/admin", admin_router::<S>());
    } else {
        tracing::info!("ADMIN_TOKEN not set, admin routes disabled");
    }

    router
        .with_state(state)
        .merge(metrics_router)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
}

fn admin_router<S: DocumentStore + Clone + 'static>() -> Router<Arc<AppState<S>>> {
    use routes::admin;

    Router::new()
        .route("/categories", post(admin::create_category::<S>))
        .route(
            "/categories/{id}",
            patch(admin::set_category_listed::<S>).delete(admin::delete_category::<S>),
        )
        .route("/brands", post(admin::create_brand::<S>))
        .route(
            "/brands/{id}",
            patch(admin::set_brand_listed::<S>).delete(admin::delete_brand::<S>),
        )
        .route("/products", post(admin::create_product::<S>))
        .route(
            "/products/{id}",
            patch(admin::set_product_listed::<S>).delete(admin::delete_product::<S>),
        )
        .route("/products/{id}/stock", put(admin::set_product_stock::<S>))
        .route(
            "/products/{id}/variants/{variant_id}/stock",
            put(admin::set_variant_stock::<S>),
        )
        .route("/orders/{id}/status", post(admin::set_order_status::<S>))
        .route(
            "/orders/{id}/approve-return",
            post(admin::approve_return::<S>),
        )
}

/// Builds the application state over a store, applying the configured
/// restock policy and admin token.
pub fn create_state<S: DocumentStore + Clone + 'static>(
    store: S,
    config: &Config,
) -> Arc<AppState<S>> {
    Arc::new(AppState::new(
        store,
        config.restock_policy(),
        config.admin_token.clone(),
    ))
}
