use std::collections::HashSet;

use common::{BrandId, CategoryId, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CatalogError;
use crate::aggregate::Aggregate;
use crate::value_objects::{Money, Spec};

/// Stock status derived from a product's total quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StockStatus {
    #[default]
    Available,
    OutOfStock,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Available => "Available",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchasable configuration of a product with its own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    id: VariantId,
    specs: Vec<Spec>,
    quantity: u32,
}

impl Variant {
    pub fn id(&self) -> VariantId {
        self.id
    }

    pub fn specs(&self) -> &[Spec] {
        &self.specs
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Highest regular price a product may carry, so line totals for any
/// stock quantity stay well inside `i64` paise.
pub const MAX_PRICE: Money = Money::from_rupees(10_000_000);

/// Input for a variant of a new product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVariant {
    pub specs: Vec<Spec>,
    pub quantity: u32,
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub regular_price: Money,
    pub sale_price: Money,
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<NewVariant>,
    /// Stock of a product sold without variants. Ignored when variants are given.
    #[serde(default)]
    pub quantity: u32,
}

/// A catalog product.
///
/// Stock lives either in the variants or, for products without variants, in
/// a flat quantity. Every quantity change goes through a method that
/// recomputes `total_quantity` and `status`, so the derived fields can never
/// drift from the stock they summarize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category_id: CategoryId,
    brand_id: BrandId,
    regular_price: Money,
    sale_price: Money,
    images: Vec<String>,
    variants: Vec<Variant>,
    quantity: u32,
    total_quantity: u32,
    status: StockStatus,
    listed: bool,
    deleted: bool,
}

impl Aggregate for Product {
    fn collection() -> &'static str {
        "products"
    }

    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl Product {
    /// Builds a product from validated input.
    ///
    /// Checks that only need the product itself. Uniqueness and the state of
    /// the referenced category and brand are checked by the catalog service.
    pub fn new(input: NewProduct) -> Result<Self, CatalogError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::BlankName { entity: "Product" });
        }

        if input.sale_price.is_negative() || input.sale_price > input.regular_price {
            return Err(CatalogError::InvalidPrice {
                regular: input.regular_price,
                sale: input.sale_price,
            });
        }

        if input.regular_price > MAX_PRICE {
            return Err(CatalogError::PriceTooHigh { max: MAX_PRICE });
        }

        if input.images.is_empty() || input.images.len() > 4 {
            return Err(CatalogError::InvalidImageCount(input.images.len()));
        }

        let variants = input
            .variants
            .into_iter()
            .map(|v| {
                validate_specs(&v.specs)?;
                Ok(Variant {
                    id: VariantId::new(),
                    specs: v.specs,
                    quantity: v.quantity,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        let quantity = if variants.is_empty() { input.quantity } else { 0 };

        let mut product = Self {
            id: ProductId::new(),
            name,
            description: input.description,
            category_id: input.category_id,
            brand_id: input.brand_id,
            regular_price: input.regular_price,
            sale_price: input.sale_price,
            images: input.images,
            variants,
            quantity,
            total_quantity: 0,
            status: StockStatus::OutOfStock,
            listed: true,
            deleted: false,
        };
        product.refresh_stock();
        Ok(product)
    }

    // Accessors

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn brand_id(&self) -> BrandId {
        self.brand_id
    }

    pub fn regular_price(&self) -> Money {
        self.regular_price
    }

    pub fn sale_price(&self) -> Money {
        self.sale_price
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    pub fn is_listed(&self) -> bool {
        self.listed
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Listed and not soft-deleted. Category and brand are not considered.
    pub fn is_active(&self) -> bool {
        self.listed && !self.deleted
    }

    // Stock

    /// Returns the stock that backs a purchase of this product.
    ///
    /// A product with variants must be bought by variant; a product without
    /// variants must be bought without one.
    pub fn stock_of(&self, variant: Option<VariantId>) -> Result<u32, CatalogError> {
        match variant {
            Some(variant_id) => self
                .variant(variant_id)
                .map(Variant::quantity)
                .ok_or(CatalogError::VariantNotFound {
                    product_id: self.id,
                    variant_id,
                }),
            None if self.has_variants() => Err(CatalogError::VariantRequired {
                product_name: self.name.clone(),
            }),
            None => Ok(self.quantity),
        }
    }

    /// Removes stock, refusing to go below zero.
    pub fn decrement_stock(
        &mut self,
        variant: Option<VariantId>,
        quantity: u32,
    ) -> Result<(), CatalogError> {
        let available = self.stock_of(variant)?;
        if quantity > available {
            return Err(CatalogError::InsufficientStock {
                product_name: self.name.clone(),
                available,
            });
        }

        *self.quantity_mut(variant)? = available - quantity;
        self.refresh_stock();
        Ok(())
    }

    /// Returns stock, e.g. after a cancelled or returned order.
    pub fn restock(&mut self, variant: Option<VariantId>, quantity: u32) -> Result<(), CatalogError> {
        let slot = self.quantity_mut(variant)?;
        *slot = slot.saturating_add(quantity);
        self.refresh_stock();
        Ok(())
    }

    /// Overwrites the stock of one variant.
    pub fn set_variant_quantity(
        &mut self,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<(), CatalogError> {
        *self.quantity_mut(Some(variant_id))? = quantity;
        self.refresh_stock();
        Ok(())
    }

    /// Overwrites the stock of a product sold without variants.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), CatalogError> {
        *self.quantity_mut(None)? = quantity;
        self.refresh_stock();
        Ok(())
    }

    pub fn set_listed(&mut self, listed: bool) {
        self.listed = listed;
    }

    /// Soft-deletes the product.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    fn quantity_mut(&mut self, variant: Option<VariantId>) -> Result<&mut u32, CatalogError> {
        match variant {
            Some(variant_id) => {
                let product_id = self.id;
                self.variants
                    .iter_mut()
                    .find(|v| v.id == variant_id)
                    .map(|v| &mut v.quantity)
                    .ok_or(CatalogError::VariantNotFound {
                        product_id,
                        variant_id,
                    })
            }
            None if self.has_variants() => Err(CatalogError::VariantRequired {
                product_name: self.name.clone(),
            }),
            None => Ok(&mut self.quantity),
        }
    }

    fn refresh_stock(&mut self) {
        self.total_quantity = if self.variants.is_empty() {
            self.quantity
        } else {
            self.variants.iter().map(|v| v.quantity).sum()
        };
        self.status = if self.total_quantity == 0 {
            StockStatus::OutOfStock
        } else {
            StockStatus::Available
        };
    }
}

fn validate_specs(specs: &[Spec]) -> Result<(), CatalogError> {
    if specs.is_empty() {
        return Err(CatalogError::InvalidVariant(
            "at least one spec is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for spec in specs {
        let name = spec.name.trim();
        if name.is_empty() || spec.value.trim().is_empty() {
            return Err(CatalogError::InvalidVariant(
                "spec names and values must not be blank".to_string(),
            ));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(CatalogError::InvalidVariant(format!(
                "duplicate spec name '{name}'"
            )));
        }
    }

    Ok(())
}
