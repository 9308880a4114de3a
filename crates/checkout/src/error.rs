//! Checkout error types.

use domain::{CatalogError, DomainError, ErrorKind};
use thiserror::Error;

/// Errors that can occur while converting a cart into an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The caller has no cart, or it has no lines.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A line asks for more than the catalog can supply.
    #[error("Only {available} items available for {product_name}")]
    InsufficientStock {
        product_name: String,
        available: u32,
    },

    /// The unit of work could not be completed. Nothing was written.
    #[error("Checkout transaction failed: {0}")]
    TransactionFailure(String),

    /// Any other domain error, e.g. a missing session or a bad address.
    #[error(transparent)]
    Domain(DomainError),
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::EmptyCart => ErrorKind::EmptyCart,
            CheckoutError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CheckoutError::TransactionFailure(_) => ErrorKind::TransactionFailure,
            CheckoutError::Domain(err) => err.kind(),
        }
    }
}

impl From<DomainError> for CheckoutError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Store(store_err) => CheckoutError::TransactionFailure(store_err.to_string()),
            DomainError::Catalog(CatalogError::InsufficientStock {
                product_name,
                available,
            }) => CheckoutError::InsufficientStock {
                product_name,
                available,
            },
            other => CheckoutError::Domain(other),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
