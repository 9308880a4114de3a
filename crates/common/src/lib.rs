//! Identifier types shared by every storefront crate.

mod types;

pub use types::{BrandId, CartId, CartItemId, CategoryId, OrderId, ProductId, UserId, VariantId};
