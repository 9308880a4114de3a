//! Shared application state.

use checkout::CheckoutCoordinator;
use document_store::DocumentStore;
use domain::{CartService, CatalogService, OrderService, RestockPolicy};

/// Services shared by every handler.
pub struct AppState<S: DocumentStore> {
    pub catalog: CatalogService<S>,
    pub carts: CartService<S>,
    pub orders: OrderService<S>,
    pub checkout: CheckoutCoordinator<S>,
    /// Token expected in `x-admin-token`. The admin routes are not mounted
    /// without one.
    pub admin_token: Option<String>,
}

impl<S: DocumentStore + Clone> AppState<S> {
    pub fn new(store: S, restock: RestockPolicy, admin_token: Option<String>) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            carts: CartService::new(store.clone()),
            orders: OrderService::with_policy(store.clone(), restock),
            checkout: CheckoutCoordinator::new(store),
            admin_token,
        }
    }
}
