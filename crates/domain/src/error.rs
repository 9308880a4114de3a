//! Domain error types.

use document_store::StoreError;
use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::order::OrderError;

/// Coarse classification of every error the storefront reports.
///
/// The HTTP layer maps each kind to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No authenticated user.
    Unauthorized,
    /// A referenced product, variant, cart item or order does not exist.
    NotFound,
    /// Malformed input.
    Validation,
    /// Requested quantity exceeds availability.
    InsufficientStock,
    /// Checkout of a cart without items.
    EmptyCart,
    /// Illegal order status change.
    InvalidTransition,
    /// Persistence or infrastructure failure.
    TransactionFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::EmptyCart => "empty_cart",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::TransactionFailure => "transaction_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The caller has no session.
    #[error("Please log in to continue")]
    Unauthorized,

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input rejected before touching any state.
    #[error("{0}")]
    Validation(String),

    /// An error raised by the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An error raised by the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// An error raised by an order.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Unauthorized => ErrorKind::Unauthorized,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Catalog(e) => e.kind(),
            DomainError::Cart(e) => e.kind(),
            DomainError::Order(e) => e.kind(),
            DomainError::Store(_) => ErrorKind::TransactionFailure,
        }
    }
}
