//! HTTP route handlers.

pub mod admin;
pub mod cart;
pub mod orders;
pub mod products;
pub mod system;

use crate::error::ApiError;

/// Rejection for a path segment that is not a UUID.
pub(crate) fn invalid_id(err: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("Invalid ID format: {err}"))
}
