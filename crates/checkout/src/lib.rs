//! Checkout for the storefront.
//!
//! Converting a cart into an order touches several documents:
//! 1. Re-validate stock for every cart line
//! 2. Write the order snapshot
//! 3. Decrement product stock
//! 4. Empty the cart
//!
//! All four run in one document store transaction. If any step fails the
//! transaction is rolled back and nothing is written.

pub mod coordinator;
pub mod error;

pub use coordinator::{CheckoutCoordinator, CheckoutReceipt, CheckoutRequest};
pub use error::CheckoutError;
