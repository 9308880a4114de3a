//! Order aggregate and related types.

mod aggregate;
mod service;
mod state;
mod value_objects;

pub use aggregate::{Order, OrderLine, StatusChange};
pub use service::{OrderService, RestockPolicy};
pub use state::{DeliveryStatus, PaymentStatus};
pub use value_objects::{PaymentMethod, ShippingAddress};

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The state machine does not allow the change.
    #[error("Invalid state transition: cannot move order from {from} to {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    /// Only pay-on-delivery orders are confirmed at checkout.
    #[error("Payment method {0} is not pay on delivery")]
    NotPayOnDelivery(PaymentMethod),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::InvalidTransition { .. } | OrderError::NotPayOnDelivery(_) => {
                ErrorKind::InvalidTransition
            }
            OrderError::UnknownPaymentMethod(_) | OrderError::UnknownStatus(_) => {
                ErrorKind::Validation
            }
        }
    }
}
