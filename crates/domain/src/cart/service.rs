//! Cart service providing the shopper-facing cart operations.

use std::collections::HashMap;

use common::{CartId, CartItemId, ProductId, VariantId};
use document_store::DocumentStore;
use serde::Serialize;

use super::{Cart, CartError, CartItem};
use crate::catalog::{CatalogService, Product, Variant};
use crate::context::RequestContext;
use crate::error::DomainError;
use crate::repository::DocumentStoreExt;
use crate::value_objects::Money;

/// A cart line with the variant as it currently stands in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    /// None when the line has no variant or the variant no longer exists.
    pub variant: Option<Variant>,
}

/// Cart as shown to the shopper.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart_id: Option<CartId>,
    pub items: Vec<CartLineView>,
    pub item_count: usize,
    pub cart_total: Money,
    pub discount: Money,
    pub shipping_charge: Money,
    pub final_total: Money,
}

impl CartView {
    /// The view returned when there is no session or no cart yet.
    pub fn empty() -> Self {
        Self {
            cart_id: None,
            items: Vec::new(),
            item_count: 0,
            cart_total: Money::zero(),
            discount: Money::zero(),
            shipping_charge: Money::zero(),
            final_total: Money::zero(),
        }
    }
}

/// Service for managing shopping carts.
pub struct CartService<S: DocumentStore> {
    store: S,
    catalog: CatalogService<S>,
}

impl<S: DocumentStore + Clone> CartService<S> {
    /// Creates a new cart service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            store,
        }
    }

    /// Adds a product to the caller's cart, creating the cart if needed.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn add_item(
        &self,
        ctx: &RequestContext,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: u32,
    ) -> Result<Cart, DomainError> {
        let user_id = ctx.user_id()?;
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity).into());
        }

        let product = self
            .catalog
            .find_available_product(product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", product_id))?;
        let available = product.available_quantity(variant_id)?;

        let mut cart = self
            .store
            .load::<Cart>(user_id.as_uuid())
            .await?
            .unwrap_or_else(|| Cart::new(user_id));

        let in_cart = cart.quantity_of(product_id, variant_id);
        let wanted = in_cart.checked_add(quantity);
        if wanted.is_none_or(|wanted| wanted > available) {
            return Err(CartError::OutOfStock {
                product_name: product.product().name().to_string(),
                available,
            }
            .into());
        }

        cart.add(product.product(), variant_id, quantity);
        self.store.save(&cart).await?;

        metrics::counter!("cart_mutations_total", "operation" => "add").increment(1);
        tracing::info!(%user_id, %product_id, quantity, "item added to cart");
        Ok(cart)
    }

    /// Replaces the quantity of a cart line.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn update_item(
        &self,
        ctx: &RequestContext,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, DomainError> {
        let user_id = ctx.user_id()?;
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity).into());
        }

        let mut cart = self.existing_cart(ctx).await?;
        let item = cart.item(item_id).ok_or(CartError::ItemNotFound(item_id))?;

        let product = self
            .catalog
            .find_available_product(item.product_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", item.product_id))?;
        let available = product.available_quantity(item.variant_id)?;
        if quantity > available {
            return Err(CartError::OutOfStock {
                product_name: product.product().name().to_string(),
                available,
            }
            .into());
        }

        cart.set_quantity(item_id, quantity)?;
        self.store.save(&cart).await?;

        metrics::counter!("cart_mutations_total", "operation" => "update").increment(1);
        tracing::info!(%user_id, %item_id, quantity, "cart item updated");
        Ok(cart)
    }

    /// Removes a line from the caller's cart. Unknown lines are ignored.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn remove_item(
        &self,
        ctx: &RequestContext,
        item_id: CartItemId,
    ) -> Result<Cart, DomainError> {
        let mut cart = self.existing_cart(ctx).await?;

        if !cart.remove(item_id) {
            tracing::debug!(%item_id, "item not in cart");
        }
        self.store.save(&cart).await?;

        metrics::counter!("cart_mutations_total", "operation" => "remove").increment(1);
        Ok(cart)
    }

    /// Empties the caller's cart. Succeeds when there is nothing to clear.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn clear(&self, ctx: &RequestContext) -> Result<(), DomainError> {
        let user_id = ctx.user_id()?;

        if let Some(mut cart) = self.store.load::<Cart>(user_id.as_uuid()).await? {
            cart.clear();
            self.store.save(&cart).await?;
        }

        metrics::counter!("cart_mutations_total", "operation" => "clear").increment(1);
        Ok(())
    }

    /// Returns the caller's cart with live variant detail, or the empty view
    /// when there is no session or no cart.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_cart(&self, ctx: &RequestContext) -> Result<CartView, DomainError> {
        let Some(user_id) = ctx.user() else {
            return Ok(CartView::empty());
        };
        let Some(cart) = self.store.load::<Cart>(user_id.as_uuid()).await? else {
            return Ok(CartView::empty());
        };

        let mut products: HashMap<ProductId, Option<Product>> = HashMap::new();
        let mut items = Vec::with_capacity(cart.item_count());
        for item in cart.items() {
            let variant = match item.variant_id {
                Some(variant_id) => {
                    if !products.contains_key(&item.product_id) {
                        let product = self.catalog.find_product(item.product_id).await?;
                        products.insert(item.product_id, product);
                    }
                    products
                        .get(&item.product_id)
                        .and_then(Option::as_ref)
                        .and_then(|p| p.variant(variant_id))
                        .cloned()
                }
                None => None,
            };
            items.push(CartLineView {
                item: item.clone(),
                variant,
            });
        }

        Ok(CartView {
            cart_id: Some(cart.id()),
            item_count: items.len(),
            items,
            cart_total: cart.cart_total(),
            discount: cart.discount(),
            shipping_charge: cart.shipping_charge(),
            final_total: cart.final_total(),
        })
    }

    async fn existing_cart(&self, ctx: &RequestContext) -> Result<Cart, DomainError> {
        let user_id = ctx.user_id()?;
        self.store
            .load::<Cart>(user_id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::not_found("Cart", user_id))
    }
}
