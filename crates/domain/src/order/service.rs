//! Order service: order history and status changes.

use common::{OrderId, UserId};
use document_store::{DocumentQuery, DocumentStore, Transaction};

use super::{DeliveryStatus, Order};
use crate::aggregate::Aggregate;
use crate::catalog::Product;
use crate::context::RequestContext;
use crate::error::DomainError;
use crate::repository::{DocumentStoreExt, TransactionExt};

/// Whether stock goes back to the catalog when an order leaves the
/// fulfilment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestockPolicy {
    /// Restock when an order is cancelled.
    pub on_cancel: bool,
    /// Restock when a return is approved.
    pub on_return: bool,
}

impl Default for RestockPolicy {
    fn default() -> Self {
        Self {
            on_cancel: false,
            on_return: true,
        }
    }
}

impl RestockPolicy {
    fn restocks(&self, to: DeliveryStatus) -> bool {
        match to {
            DeliveryStatus::Cancelled => self.on_cancel,
            DeliveryStatus::Returned => self.on_return,
            _ => false,
        }
    }
}

/// Service for reading orders and moving them through the delivery states.
///
/// Shopper operations check that the caller owns the order; back-office
/// operations do not.
pub struct OrderService<S: DocumentStore> {
    store: S,
    policy: RestockPolicy,
}

impl<S: DocumentStore> OrderService<S> {
    /// Creates a new order service with the default restock policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RestockPolicy::default())
    }

    pub fn with_policy(store: S, policy: RestockPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> RestockPolicy {
        self.policy
    }

    /// The caller's orders, newest first.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn list_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>, DomainError> {
        let user_id = ctx.user_id()?;
        self.store
            .find(
                DocumentQuery::collection(Order::collection())
                    .field_eq("user_id", user_id.to_string())
                    .newest_first(),
            )
            .await
    }

    /// One of the caller's orders. Orders of other users are reported as
    /// not found.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_order(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        let user_id = ctx.user_id()?;
        self.owned_order(order_id, Some(user_id)).await
    }

    /// Loads any order. Returns None if it doesn't exist.
    pub async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        self.store.load(order_id.as_uuid()).await
    }

    /// Cancels one of the caller's orders.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn cancel_order(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        let user_id = ctx.user_id()?;
        self.transition(order_id, Some(user_id), DeliveryStatus::Cancelled)
            .await
    }

    /// Asks to return one of the caller's delivered orders.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn request_return(
        &self,
        ctx: &RequestContext,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        let user_id = ctx.user_id()?;
        self.transition(order_id, Some(user_id), DeliveryStatus::ReturnRequested)
            .await
    }

    /// Back-office: moves an order to the given status.
    #[tracing::instrument(skip(self))]
    pub async fn advance_delivery(
        &self,
        order_id: OrderId,
        status: DeliveryStatus,
    ) -> Result<Order, DomainError> {
        self.transition(order_id, None, status).await
    }

    /// Back-office: completes a requested return.
    #[tracing::instrument(skip(self))]
    pub async fn approve_return(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.transition(order_id, None, DeliveryStatus::Returned)
            .await
    }

    /// Confirms a freshly placed cash on delivery order.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_cash_on_delivery(&self, order_id: OrderId) -> Result<Order, DomainError> {
        let mut order = self.owned_order(order_id, None).await?;
        order.confirm_cash_on_delivery()?;
        self.store.save(&order).await?;

        metrics::counter!("order_transitions_total", "to" => DeliveryStatus::Confirmed.as_str())
            .increment(1);
        tracing::info!(%order_id, "cash on delivery order confirmed");
        Ok(order)
    }

    async fn transition(
        &self,
        order_id: OrderId,
        owner: Option<UserId>,
        to: DeliveryStatus,
    ) -> Result<Order, DomainError> {
        let order = if self.policy.restocks(to) {
            let mut tx = self.store.begin().await?;
            match transition_and_restock(tx.as_mut(), order_id, owner, to).await {
                Ok(order) => {
                    tx.commit().await?;
                    order
                }
                Err(e) => {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(%order_id, error = %rollback_err, "rollback failed");
                    }
                    return Err(e);
                }
            }
        } else {
            let mut order = self.owned_order(order_id, owner).await?;
            order.transition_to(to)?;
            self.store.save(&order).await?;
            order
        };

        metrics::counter!("order_transitions_total", "to" => to.as_str()).increment(1);
        tracing::info!(%order_id, to = %to, "order status changed");
        Ok(order)
    }

    async fn owned_order(
        &self,
        order_id: OrderId,
        owner: Option<UserId>,
    ) -> Result<Order, DomainError> {
        self.store
            .load::<Order>(order_id.as_uuid())
            .await?
            .filter(|order| owner.is_none_or(|user| order.user_id() == user))
            .ok_or_else(|| DomainError::not_found("Order", order_id))
    }
}

/// Changes the order status and puts its lines back in stock, all staged
/// in one transaction.
async fn transition_and_restock(
    tx: &mut dyn Transaction,
    order_id: OrderId,
    owner: Option<UserId>,
    to: DeliveryStatus,
) -> Result<Order, DomainError> {
    let mut order = tx
        .load::<Order>(order_id.as_uuid())
        .await?
        .filter(|order| owner.is_none_or(|user| order.user_id() == user))
        .ok_or_else(|| DomainError::not_found("Order", order_id))?;
    order.transition_to(to)?;

    for line in order.lines() {
        let Some(mut product) = tx.load::<Product>(line.product_id.as_uuid()).await? else {
            tracing::warn!(product_id = %line.product_id, "product gone, skipping restock");
            continue;
        };
        if let Err(e) = product.restock(line.variant_id, line.quantity) {
            tracing::warn!(product_id = %line.product_id, error = %e, "skipping restock");
            continue;
        }
        tx.save(&product).await?;
    }

    tx.save(&order).await?;
    Ok(order)
}
