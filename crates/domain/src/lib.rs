//! Domain layer for the storefront.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait and typed repository access over the document store
//! - Catalog products with variant stock, categories and brands
//! - The shopping cart with its derived totals
//! - Orders with the delivery status state machine

pub mod aggregate;
pub mod cart;
pub mod catalog;
pub mod context;
pub mod error;
pub mod order;
pub mod repository;
pub mod value_objects;

pub use aggregate::Aggregate;
pub use cart::{
    Cart, CartError, CartItem, CartLineView, CartService, CartView, FREE_SHIPPING_THRESHOLD,
    SHIPPING_CHARGE,
};
pub use catalog::{
    AvailableProduct, Brand, CatalogError, CatalogService, Category, MAX_PRICE, NewProduct,
    NewVariant, Product, StockStatus, Variant,
};
pub use context::RequestContext;
pub use error::{DomainError, ErrorKind};
pub use order::{
    DeliveryStatus, Order, OrderError, OrderLine, OrderService, PaymentMethod, PaymentStatus,
    RestockPolicy, ShippingAddress, StatusChange,
};
pub use repository::{DocumentStoreExt, TransactionExt};
pub use value_objects::{Money, Spec};
