//! Checkout coordinator: turns a cart into an order in one unit of work.

use std::collections::HashMap;
use std::time::Instant;

use common::{OrderId, ProductId, UserId};
use document_store::{DocumentStore, Transaction};
use domain::{
    Cart, CartItem, CatalogService, DocumentStoreExt, DomainError, ErrorKind, Order, OrderService,
    PaymentMethod, Product, RequestContext, ShippingAddress, TransactionExt,
};
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// What the shopper submits at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    /// Parsed at checkout so an unknown method is reported as a validation
    /// error.
    pub payment_method: String,
}

/// Returned after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub reference: String,
    pub payment_method: PaymentMethod,
    pub redirect_url: String,
}

/// Orchestrates checkout.
///
/// Re-validating stock, writing the order, decrementing stock and clearing
/// the cart run inside one store transaction: either all of it lands or
/// none of it does.
pub struct CheckoutCoordinator<S: DocumentStore> {
    store: S,
    catalog: CatalogService<S>,
    orders: OrderService<S>,
}

impl<S: DocumentStore + Clone> CheckoutCoordinator<S> {
    /// Creates a new checkout coordinator.
    pub fn new(store: S) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            orders: OrderService::new(store.clone()),
            store,
        }
    }

    /// Places an order for everything in the caller's cart.
    #[tracing::instrument(skip(self, ctx, request), fields(user_id = tracing::field::Empty))]
    pub async fn process_checkout(
        &self,
        ctx: &RequestContext,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = Instant::now();

        let result = self.checkout(ctx, request).await;

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed_total").increment(1);
                tracing::info!(
                    order_id = %receipt.order_id,
                    reference = %receipt.reference,
                    duration,
                    "checkout completed"
                );
            }
            Err(err) => {
                let kind = err.kind();
                metrics::counter!("checkout_failed_total", "reason" => kind.as_str()).increment(1);
                if kind == ErrorKind::TransactionFailure {
                    tracing::error!(error = %err, "checkout failed");
                } else {
                    tracing::info!(reason = %kind, error = %err, "checkout rejected");
                }
            }
        }
        result
    }

    async fn checkout(
        &self,
        ctx: &RequestContext,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt> {
        let user_id = ctx.user_id()?;
        tracing::Span::current().record("user_id", tracing::field::display(user_id));

        request.shipping_address.validate()?;
        let payment_method: PaymentMethod = request
            .payment_method
            .parse()
            .map_err(DomainError::from)?;

        // Cheap pre-check outside the transaction; re-checked under lock.
        let cart = self
            .store
            .load::<Cart>(user_id.as_uuid())
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;
        let cart_id = cart.id();

        let mut tx = self.store.begin().await.map_err(DomainError::from)?;
        let order = match self
            .place_order(tx.as_mut(), user_id, request.shipping_address, payment_method)
            .await
        {
            Ok(order) => order,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(%user_id, %cart_id, error = %rollback_err, "rollback failed");
                }
                if err.kind() == ErrorKind::TransactionFailure {
                    tracing::error!(%user_id, %cart_id, error = %err, "checkout rolled back");
                }
                return Err(err);
            }
        };

        if let Err(err) = tx.commit().await {
            tracing::error!(%user_id, %cart_id, error = %err, "checkout commit failed");
            return Err(CheckoutError::TransactionFailure(err.to_string()));
        }

        if payment_method.is_pay_on_delivery()
            && let Err(err) = self.orders.confirm_cash_on_delivery(order.id()).await
        {
            tracing::warn!(order_id = %order.id(), error = %err, "cash on delivery confirmation failed");
        }

        Ok(CheckoutReceipt {
            order_id: order.id(),
            reference: order.reference().to_string(),
            payment_method,
            redirect_url: format!("/order-confirmation/{}", order.id()),
        })
    }

    /// Stages the order, the stock decrements and the emptied cart.
    async fn place_order(
        &self,
        tx: &mut dyn Transaction,
        user_id: UserId,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        let mut cart = tx
            .load::<Cart>(user_id.as_uuid())
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        let mut products: HashMap<ProductId, Product> = HashMap::new();
        for item in cart.items() {
            if !products.contains_key(&item.product_id)
                && let Some(product) = tx.load::<Product>(item.product_id.as_uuid()).await?
            {
                products.insert(item.product_id, product);
            }

            let available = match products.get(&item.product_id) {
                Some(product) => self.available_quantity(product, item).await?,
                None => 0,
            };
            if item.quantity > available {
                return Err(CheckoutError::InsufficientStock {
                    product_name: item.product_name.clone(),
                    available,
                });
            }
        }

        let order = Order::place(&cart, shipping_address, payment_method);
        tx.save(&order).await?;

        for item in cart.items() {
            if let Some(product) = products.get_mut(&item.product_id) {
                product
                    .decrement_stock(item.variant_id, item.quantity)
                    .map_err(DomainError::from)?;
            }
        }
        for product in products.values() {
            tx.save(product).await?;
        }

        cart.clear();
        tx.save(&cart).await?;

        tracing::debug!(order_id = %order.id(), lines = order.lines().len(), "order staged");
        Ok(order)
    }

    /// Stock a line can draw on: zero when the product is no longer sold or
    /// the variant is gone.
    async fn available_quantity(
        &self,
        product: &Product,
        item: &CartItem,
    ) -> Result<u32> {
        let available = match self.catalog.availability(product.clone()).await? {
            Some(available) => available.available_quantity(item.variant_id).unwrap_or(0),
            None => 0,
        };
        Ok(available)
    }
}
