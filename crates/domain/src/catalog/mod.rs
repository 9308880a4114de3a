//! Catalog: products with embedded variants, categories and brands.

mod product;
mod service;
mod taxonomy;

pub use product::{MAX_PRICE, NewProduct, NewVariant, Product, StockStatus, Variant};
pub use service::{AvailableProduct, CatalogService};
pub use taxonomy::{Brand, Category};

use common::{ProductId, VariantId};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::value_objects::Money;

/// Errors raised by catalog records.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required name is blank.
    #[error("{entity} name is required")]
    BlankName { entity: &'static str },

    /// Another active record already uses the name.
    #[error("{entity} named '{name}' already exists")]
    DuplicateName { entity: &'static str, name: String },

    /// Sale price above regular price, or a negative price.
    #[error("Invalid pricing: sale price {sale} must not exceed regular price {regular}")]
    InvalidPrice { regular: Money, sale: Money },

    /// Price above the catalog ceiling.
    #[error("Price must not exceed {max}")]
    PriceTooHigh { max: Money },

    /// Products carry between one and four images.
    #[error("A product needs 1 to 4 images, got {0}")]
    InvalidImageCount(usize),

    /// A variant's specs are empty, blank or repeat a name.
    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    /// The referenced category or brand is missing, unlisted or deleted.
    #[error("{entity} {id} is not available")]
    Unavailable { entity: &'static str, id: String },

    /// The product has no variant with this id.
    #[error("Variant {variant_id} not found on product {product_id}")]
    VariantNotFound {
        product_id: ProductId,
        variant_id: VariantId,
    },

    /// The product is sold by variant and none was chosen.
    #[error("Please select a variant of {product_name}")]
    VariantRequired { product_name: String },

    /// A decrement would take stock below zero.
    #[error("Only {available} items available for {product_name}")]
    InsufficientStock {
        product_name: String,
        available: u32,
    },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::VariantNotFound { .. } => ErrorKind::NotFound,
            CatalogError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            _ => ErrorKind::Validation,
        }
    }
}
