//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId, VariantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DeliveryStatus, OrderError, PaymentMethod, PaymentStatus, ShippingAddress};
use crate::aggregate::Aggregate;
use crate::cart::Cart;
use crate::value_objects::{Money, Spec};

/// One purchased line, copied from the cart at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub variant_id: Option<VariantId>,
    pub specs: Vec<Spec>,
    pub quantity: u32,
    pub price: Money,
    pub total_price: Money,
}

/// An entry in an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: DeliveryStatus,
    pub at: DateTime<Utc>,
}

/// Order aggregate root.
///
/// An immutable snapshot of a checked-out cart. After creation only the
/// payment and delivery statuses change, and only through the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    reference: String,
    user_id: UserId,
    lines: Vec<OrderLine>,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    subtotal: Money,
    shipping_charge: Money,
    discount: Money,
    total: Money,
    payment_status: PaymentStatus,
    delivery_status: DeliveryStatus,
    history: Vec<StatusChange>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Aggregate for Order {
    fn collection() -> &'static str {
        "orders"
    }

    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Order {
    /// Snapshots a cart into a new pending order.
    pub fn place(cart: &Cart, shipping_address: ShippingAddress, payment_method: PaymentMethod) -> Self {
        let id = OrderId::new();
        let now = Utc::now();
        let lines = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                product_name: item.product_name.clone(),
                variant_id: item.variant_id,
                specs: item.specs.clone(),
                quantity: item.quantity,
                price: item.price,
                total_price: item.total_price,
            })
            .collect();

        Self {
            id,
            reference: reference_for(id),
            user_id: cart.user_id(),
            lines,
            shipping_address,
            payment_method,
            subtotal: cart.cart_total(),
            shipping_charge: cart.shipping_charge(),
            discount: cart.discount(),
            total: cart.final_total(),
            payment_status: PaymentStatus::Pending,
            delivery_status: DeliveryStatus::Pending,
            history: vec![StatusChange {
                status: DeliveryStatus::Pending,
                at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    // Accessors

    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Human-facing confirmation reference, e.g. `ORD-1A2B3C4D`.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn shipping_charge(&self) -> Money {
        self.shipping_charge
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.delivery_status
    }

    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Transitions

    /// Confirms a pay-on-delivery order: payment is settled at the door.
    pub fn confirm_cash_on_delivery(&mut self) -> Result<(), OrderError> {
        if !self.payment_method.is_pay_on_delivery() {
            return Err(OrderError::NotPayOnDelivery(self.payment_method));
        }
        self.transition_to(DeliveryStatus::Confirmed)?;
        self.payment_status = PaymentStatus::Completed;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition_to(DeliveryStatus::Cancelled)
    }

    pub fn request_return(&mut self) -> Result<(), OrderError> {
        self.transition_to(DeliveryStatus::ReturnRequested)
    }

    pub fn approve_return(&mut self) -> Result<(), OrderError> {
        self.transition_to(DeliveryStatus::Returned)
    }

    /// Moves the order to `next` if the state machine allows it and records
    /// the change in the history.
    pub fn transition_to(&mut self, next: DeliveryStatus) -> Result<(), OrderError> {
        if !self.delivery_status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.delivery_status,
                to: next,
            });
        }

        let now = Utc::now();
        self.delivery_status = next;
        self.history.push(StatusChange {
            status: next,
            at: now,
        });
        self.updated_at = now;
        Ok(())
    }
}

fn reference_for(id: OrderId) -> String {
    let hex = id.as_uuid().simple().to_string();
    format!("ORD-{}", hex[..8].to_ascii_uppercase())
}
