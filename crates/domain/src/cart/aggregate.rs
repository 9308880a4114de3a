//! Cart aggregate implementation.

use common::{CartId, CartItemId, ProductId, UserId, VariantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CartError;
use crate::aggregate::Aggregate;
use crate::catalog::Product;
use crate::value_objects::{Money, Spec};

/// Carts at or above this total ship free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_rupees(999);

/// Flat shipping charge below the threshold.
pub const SHIPPING_CHARGE: Money = Money::from_rupees(50);

/// One product (and optional variant) line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    /// Product name when the item was added.
    pub product_name: String,
    /// Variant specs when the item was added.
    pub specs: Vec<Spec>,
    pub quantity: u32,
    /// Sale price when the item was added.
    pub price: Money,
    pub total_price: Money,
}

impl CartItem {
    fn matches(&self, product_id: ProductId, variant_id: Option<VariantId>) -> bool {
        self.product_id == product_id && self.variant_id == variant_id
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.total_price = self.price.multiply(quantity);
    }
}

/// A user's shopping cart.
///
/// Stored under the owner's user id, so each user has at most one cart.
/// The cached totals are recomputed by every mutating method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    user_id: UserId,
    items: Vec<CartItem>,
    cart_total: Money,
    discount: Money,
    shipping_charge: Money,
    final_total: Money,
}

impl Aggregate for Cart {
    fn collection() -> &'static str {
        "carts"
    }

    fn key(&self) -> Uuid {
        self.user_id.as_uuid()
    }
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            user_id,
            items: Vec::new(),
            cart_total: Money::zero(),
            discount: Money::zero(),
            shipping_charge: Money::zero(),
            final_total: Money::zero(),
        }
    }

    // Accessors

    pub fn id(&self) -> CartId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn cart_total(&self) -> Money {
        self.cart_total
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn shipping_charge(&self) -> Money {
        self.shipping_charge
    }

    pub fn final_total(&self) -> Money {
        self.final_total
    }

    /// Quantity already in the cart for a product and variant.
    pub fn quantity_of(&self, product_id: ProductId, variant_id: Option<VariantId>) -> u32 {
        self.items
            .iter()
            .filter(|i| i.matches(product_id, variant_id))
            .fold(0u32, |total, i| total.saturating_add(i.quantity))
    }

    // Mutations

    /// Adds a quantity of a product, merging with an existing line for the
    /// same product and variant. Stock is checked by the caller.
    pub fn add(&mut self, product: &Product, variant_id: Option<VariantId>, quantity: u32) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|i| i.matches(product.id(), variant_id))
        {
            let merged = line.quantity.saturating_add(quantity);
            line.set_quantity(merged);
        } else {
            let specs = variant_id
                .and_then(|id| product.variant(id))
                .map(|v| v.specs().to_vec())
                .unwrap_or_default();
            let price = product.sale_price();
            self.items.push(CartItem {
                id: CartItemId::new(),
                product_id: product.id(),
                variant_id,
                product_name: product.name().to_string(),
                specs,
                quantity,
                price,
                total_price: price.multiply(quantity),
            });
        }
        self.recompute();
    }

    /// Replaces the quantity of a line.
    pub fn set_quantity(&mut self, item_id: CartItemId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let line = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(CartError::ItemNotFound(item_id))?;
        line.set_quantity(quantity);
        self.recompute();
        Ok(())
    }

    /// Removes a line. Returns false if the cart had no such line.
    pub fn remove(&mut self, item_id: CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.recompute();
        self.items.len() != before
    }

    /// Removes every line and zeroes the totals.
    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        if self.items.is_empty() {
            self.cart_total = Money::zero();
            self.discount = Money::zero();
            self.shipping_charge = Money::zero();
            self.final_total = Money::zero();
            return;
        }

        self.cart_total = self.items.iter().map(|i| i.total_price).sum();
        self.discount = Money::zero();
        self.shipping_charge = if self.cart_total >= FREE_SHIPPING_THRESHOLD {
            Money::zero()
        } else {
            SHIPPING_CHARGE
        };
        self.final_total = self.cart_total - self.discount + self.shipping_charge;
    }
}
