//! Shopping cart aggregate and service.

mod aggregate;
mod service;

pub use aggregate::{Cart, CartItem, FREE_SHIPPING_THRESHOLD, SHIPPING_CHARGE};
pub use service::{CartLineView, CartService, CartView};

use common::CartItemId;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Item not found in cart.
    #[error("Item not found in cart: {0}")]
    ItemNotFound(CartItemId),

    /// Invalid quantity.
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(u32),

    /// Requested quantity exceeds availability.
    #[error("Only {available} items available for {product_name}")]
    OutOfStock {
        product_name: String,
        available: u32,
    },
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::ItemNotFound(_) => ErrorKind::NotFound,
            CartError::InvalidQuantity(_) => ErrorKind::Validation,
            CartError::OutOfStock { .. } => ErrorKind::InsufficientStock,
        }
    }
}
