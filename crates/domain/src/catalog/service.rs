//! Catalog service: back-office CRUD and the available-product view.

use common::{BrandId, CategoryId, ProductId, VariantId};
use document_store::{DocumentQuery, DocumentStore};

use super::{Brand, CatalogError, Category, NewProduct, Product, Variant};
use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::repository::DocumentStoreExt;

/// A product that passed the listing rules: the product, its category and
/// its brand are all listed and not deleted.
///
/// Cart and checkout only ever read stock through this view.
#[derive(Debug, Clone)]
pub struct AvailableProduct {
    product: Product,
}

impl AvailableProduct {
    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn into_product(self) -> Product {
        self.product
    }

    /// Stock available for the given variant choice.
    pub fn available_quantity(&self, variant: Option<VariantId>) -> Result<u32, CatalogError> {
        self.product.stock_of(variant)
    }
}

/// Service for managing the catalog.
pub struct CatalogService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // Categories and brands

    #[tracing::instrument(skip(self))]
    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Category, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::BlankName { entity: "Category" }.into());
        }
        if self
            .name_taken::<Category>(name, |c| c.name.as_str())
            .await?
        {
            return Err(CatalogError::DuplicateName {
                entity: "Category",
                name: name.to_string(),
            }
            .into());
        }

        let category = Category::new(name, description.trim());
        self.store.save(&category).await?;
        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_brand(&self, name: &str) -> Result<Brand, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::BlankName { entity: "Brand" }.into());
        }
        if self
            .name_taken::<Brand>(name, |b| b.name.as_str())
            .await?
        {
            return Err(CatalogError::DuplicateName {
                entity: "Brand",
                name: name.to_string(),
            }
            .into());
        }

        let brand = Brand::new(name);
        self.store.save(&brand).await?;
        tracing::info!(brand_id = %brand.id, "brand created");
        Ok(brand)
    }

    /// Categories that are not soft-deleted.
    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.store
            .find(DocumentQuery::collection(Category::collection()).field_eq("deleted", false))
            .await
    }

    /// Brands that are not soft-deleted.
    pub async fn list_brands(&self) -> Result<Vec<Brand>, DomainError> {
        self.store
            .find(DocumentQuery::collection(Brand::collection()).field_eq("deleted", false))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_category_listed(
        &self,
        id: CategoryId,
        listed: bool,
    ) -> Result<Category, DomainError> {
        let mut category = self.category(id).await?;
        category.listed = listed;
        self.store.save(&category).await?;
        Ok(category)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), DomainError> {
        let mut category = self.category(id).await?;
        category.deleted = true;
        self.store.save(&category).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_brand_listed(&self, id: BrandId, listed: bool) -> Result<Brand, DomainError> {
        let mut brand = self.brand(id).await?;
        brand.listed = listed;
        self.store.save(&brand).await?;
        Ok(brand)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_brand(&self, id: BrandId) -> Result<(), DomainError> {
        let mut brand = self.brand(id).await?;
        brand.deleted = true;
        self.store.save(&brand).await
    }

    // Products

    /// Creates a product after checking its name is unique and its category
    /// and brand are active.
    #[tracing::instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, DomainError> {
        let category = self.category(input.category_id).await?;
        if !category.is_active() {
            return Err(CatalogError::Unavailable {
                entity: "Category",
                id: category.id.to_string(),
            }
            .into());
        }

        let brand = self.brand(input.brand_id).await?;
        if !brand.is_active() {
            return Err(CatalogError::Unavailable {
                entity: "Brand",
                id: brand.id.to_string(),
            }
            .into());
        }

        let product = Product::new(input)?;
        if self
            .name_taken::<Product>(product.name(), Product::name)
            .await?
        {
            return Err(CatalogError::DuplicateName {
                entity: "Product",
                name: product.name().to_string(),
            }
            .into());
        }

        self.store.save(&product).await?;
        tracing::info!(product_id = %product.id(), "product created");
        Ok(product)
    }

    /// Loads a product regardless of its listing state.
    pub async fn find_product(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        self.store.load(id.as_uuid()).await
    }

    /// Loads a product through the available-product view.
    pub async fn find_available_product(
        &self,
        id: ProductId,
    ) -> Result<Option<AvailableProduct>, DomainError> {
        match self.find_product(id).await? {
            Some(product) => self.availability(product).await,
            None => Ok(None),
        }
    }

    /// Applies the listing rules to an already loaded product.
    ///
    /// Returns None when the product, its category or its brand is unlisted,
    /// deleted or missing.
    pub async fn availability(
        &self,
        product: Product,
    ) -> Result<Option<AvailableProduct>, DomainError> {
        if !product.is_active() {
            return Ok(None);
        }

        let category: Option<Category> = self.store.load(product.category_id().as_uuid()).await?;
        if !category.is_some_and(|c| c.is_active()) {
            return Ok(None);
        }

        let brand: Option<Brand> = self.store.load(product.brand_id().as_uuid()).await?;
        if !brand.is_some_and(|b| b.is_active()) {
            return Ok(None);
        }

        Ok(Some(AvailableProduct { product }))
    }

    /// Every product currently available to shoppers.
    pub async fn list_available_products(&self) -> Result<Vec<Product>, DomainError> {
        let candidates: Vec<Product> = self
            .store
            .find(
                DocumentQuery::collection(Product::collection())
                    .field_eq("listed", true)
                    .field_eq("deleted", false),
            )
            .await?;

        let mut available = Vec::with_capacity(candidates.len());
        for product in candidates {
            if let Some(view) = self.availability(product).await? {
                available.push(view.into_product());
            }
        }
        Ok(available)
    }

    pub async fn find_variant(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
    ) -> Result<Option<Variant>, DomainError> {
        Ok(self
            .find_product(product_id)
            .await?
            .and_then(|p| p.variant(variant_id).cloned()))
    }

    pub async fn save_product(&self, product: &Product) -> Result<(), DomainError> {
        self.store.save(product).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_variant_quantity(
        &self,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<Product, DomainError> {
        let mut product = self.product(product_id).await?;
        product.set_variant_quantity(variant_id, quantity)?;
        self.store.save(&product).await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_product_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Product, DomainError> {
        let mut product = self.product(product_id).await?;
        product.set_quantity(quantity)?;
        self.store.save(&product).await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_product_listed(
        &self,
        product_id: ProductId,
        listed: bool,
    ) -> Result<Product, DomainError> {
        let mut product = self.product(product_id).await?;
        product.set_listed(listed);
        self.store.save(&product).await?;
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), DomainError> {
        let mut product = self.product(product_id).await?;
        product.mark_deleted();
        self.store.save(&product).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, DomainError> {
        self.find_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    async fn category(&self, id: CategoryId) -> Result<Category, DomainError> {
        self.store
            .load(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    async fn brand(&self, id: BrandId) -> Result<Brand, DomainError> {
        self.store
            .load(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::not_found("Brand", id))
    }

    /// Case-insensitive name check among records that are not soft-deleted.
    async fn name_taken<A: Aggregate>(
        &self,
        name: &str,
        name_of: fn(&A) -> &str,
    ) -> Result<bool, DomainError> {
        let wanted = name.to_lowercase();
        let records: Vec<A> = self
            .store
            .find(DocumentQuery::collection(A::collection()).field_eq("deleted", false))
            .await?;
        Ok(records.iter().any(|r| name_of(r).to_lowercase() == wanted))
    }
}

impl<S: DocumentStore + Clone> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewVariant;
    use crate::value_objects::{Money, Spec};
    use document_store::InMemoryDocumentStore;

    fn service() -> CatalogService<InMemoryDocumentStore> {
        CatalogService::new(InMemoryDocumentStore::new())
    }

    async fn seed(service: &CatalogService<InMemoryDocumentStore>) -> (Category, Brand) {
        let category = service.create_category("Phones", "Smartphones").await.unwrap();
        let brand = service.create_brand("Acme").await.unwrap();
        (category, brand)
    }

    fn new_product(category: &Category, brand: &Brand, name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "A phone".to_string(),
            category_id: category.id,
            brand_id: brand.id,
            regular_price: Money::from_rupees(150),
            sale_price: Money::from_rupees(100),
            images: vec!["front.jpg".to_string()],
            variants: vec![NewVariant {
                specs: vec![Spec::new("Colour", "Black")],
                quantity: 5,
            }],
            quantity: 0,
        }
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_ignoring_case() {
        let service = service();
        seed(&service).await;

        let err = service.create_category("PHONES", "").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Catalog(CatalogError::DuplicateName { .. })
        ));

        let err = service.create_brand(" acme ").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Catalog(CatalogError::DuplicateName { .. })
        ));
    }

    #[tokio::test]
    async fn deleted_names_can_be_reused() {
        let service = service();
        let (category, _) = seed(&service).await;

        service.delete_category(category.id).await.unwrap();
        service.create_category("Phones", "again").await.unwrap();

        assert_eq!(service.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_product_and_find_available() {
        let service = service();
        let (category, brand) = seed(&service).await;

        let product = service
            .create_product(new_product(&category, &brand, "Phone X"))
            .await
            .unwrap();

        let available = service
            .find_available_product(product.id())
            .await
            .unwrap()
            .unwrap();
        let variant = product.variants()[0].id();
        assert_eq!(available.available_quantity(Some(variant)).unwrap(), 5);

        let found = service
            .find_variant(product.id(), variant)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.specs()[0].value, "Black");
    }

    #[tokio::test]
    async fn duplicate_product_name_is_rejected() {
        let service = service();
        let (category, brand) = seed(&service).await;
        service
            .create_product(new_product(&category, &brand, "Phone X"))
            .await
            .unwrap();

        let err = service
            .create_product(new_product(&category, &brand, "phone x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Catalog(CatalogError::DuplicateName { .. })
        ));
    }

    #[tokio::test]
    async fn product_needs_active_category() {
        let service = service();
        let (category, brand) = seed(&service).await;
        service.set_category_listed(category.id, false).await.unwrap();

        let err = service
            .create_product(new_product(&category, &brand, "Phone X"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Catalog(CatalogError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn listing_rules_hide_products() {
        let service = service();
        let (category, brand) = seed(&service).await;
        let product = service
            .create_product(new_product(&category, &brand, "Phone X"))
            .await
            .unwrap();
        assert_eq!(service.list_available_products().await.unwrap().len(), 1);

        service.set_brand_listed(brand.id, false).await.unwrap();
        assert!(
            service
                .find_available_product(product.id())
                .await
                .unwrap()
                .is_none()
        );
        assert!(service.list_available_products().await.unwrap().is_empty());

        service.set_brand_listed(brand.id, true).await.unwrap();
        service.delete_product(product.id()).await.unwrap();
        assert!(
            service
                .find_available_product(product.id())
                .await
                .unwrap()
                .is_none()
        );
        // The raw record is still there.
        assert!(service.find_product(product.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn stock_updates_recompute_totals() {
        let service = service();
        let (category, brand) = seed(&service).await;
        let product = service
            .create_product(new_product(&category, &brand, "Phone X"))
            .await
            .unwrap();
        let variant = product.variants()[0].id();

        let updated = service
            .set_variant_quantity(product.id(), variant, 0)
            .await
            .unwrap();
        assert_eq!(updated.total_quantity(), 0);

        let err = service
            .set_product_quantity(product.id(), 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Catalog(CatalogError::VariantRequired { .. })
        ));

        let err = service
            .set_product_listed(ProductId::new(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
