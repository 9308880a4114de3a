//! Integration tests for the order service.
//!
//! Orders are placed directly from a cart snapshot here; the checkout crate
//! covers the full checkout path.

use common::{OrderId, UserId};
use document_store::InMemoryDocumentStore;
use domain::{
    Cart, CatalogService, DeliveryStatus, DocumentStoreExt, DomainError, ErrorKind, Money,
    NewProduct, Order, OrderError, OrderService, PaymentMethod, PaymentStatus, Product,
    RequestContext, RestockPolicy, ShippingAddress,
};

struct Fixture {
    store: InMemoryDocumentStore,
    catalog: CatalogService<InMemoryDocumentStore>,
    lamp: Product,
}

impl Fixture {
    async fn new() -> Self {
        let store = InMemoryDocumentStore::new();
        let catalog = CatalogService::new(store.clone());
        let category = catalog.create_category("Home", "").await.unwrap();
        let brand = catalog.create_brand("Glow").await.unwrap();
        let lamp = catalog
            .create_product(NewProduct {
                name: "Lamp".to_string(),
                description: String::new(),
                category_id: category.id,
                brand_id: brand.id,
                regular_price: Money::from_rupees(80),
                sale_price: Money::from_rupees(80),
                images: vec!["lamp.jpg".to_string()],
                variants: vec![],
                quantity: 8,
            })
            .await
            .unwrap();

        Self {
            store,
            catalog,
            lamp,
        }
    }

    fn service(&self, policy: RestockPolicy) -> OrderService<InMemoryDocumentStore> {
        OrderService::with_policy(self.store.clone(), policy)
    }

    /// Saves an order of two lamps for the user.
    async fn place_order(&self, user: UserId, method: PaymentMethod) -> Order {
        let mut cart = Cart::new(user);
        cart.add(&self.lamp, None, 2);
        let order = Order::place(&cart, address(), method);
        self.store.save(&order).await.unwrap();
        order
    }

    async fn lamp_stock(&self) -> u32 {
        self.catalog
            .find_product(self.lamp.id())
            .await
            .unwrap()
            .unwrap()
            .total_quantity()
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        address: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn list_orders_returns_own_orders_newest_first() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let user = UserId::new();

        let first = fx.place_order(user, PaymentMethod::Card).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = fx.place_order(user, PaymentMethod::Upi).await;
        fx.place_order(UserId::new(), PaymentMethod::Card).await;

        let orders = service
            .list_orders(&RequestContext::authenticated(user))
            .await
            .unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id(), second.id());
        assert_eq!(orders[1].id(), first.id());
    }

    #[tokio::test]
    async fn other_users_orders_are_not_found() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let order = fx.place_order(UserId::new(), PaymentMethod::Card).await;

        let err = service
            .get_order(&RequestContext::authenticated(UserId::new()), order.id())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = service
            .get_order(&RequestContext::anonymous(), order.id())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn get_order_returns_snapshot() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let user = UserId::new();
        let placed = fx.place_order(user, PaymentMethod::Card).await;

        let order = service
            .get_order(&RequestContext::authenticated(user), placed.id())
            .await
            .unwrap();

        assert_eq!(order, placed);
        assert_eq!(order.total(), Money::from_rupees(210));
    }
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn shipped_order_can_be_cancelled() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let user = UserId::new();
        let order = fx.place_order(user, PaymentMethod::Card).await;

        service
            .advance_delivery(order.id(), DeliveryStatus::Processing)
            .await
            .unwrap();
        service
            .advance_delivery(order.id(), DeliveryStatus::Shipped)
            .await
            .unwrap();
        let cancelled = service
            .cancel_order(&RequestContext::authenticated(user), order.id())
            .await
            .unwrap();

        assert_eq!(cancelled.delivery_status(), DeliveryStatus::Cancelled);
        assert_eq!(cancelled.history().len(), 4);
        // Default policy leaves stock alone on cancel.
        assert_eq!(fx.lamp_stock().await, 8);
    }

    #[tokio::test]
    async fn delivered_order_cannot_be_cancelled() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let user = UserId::new();
        let order = fx.place_order(user, PaymentMethod::Card).await;
        for status in [
            DeliveryStatus::Processing,
            DeliveryStatus::Shipped,
            DeliveryStatus::Delivered,
        ] {
            service.advance_delivery(order.id(), status).await.unwrap();
        }

        let err = service
            .cancel_order(&RequestContext::authenticated(user), order.id())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Order(OrderError::InvalidTransition { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        let stored = service.find_order(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.delivery_status(), DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn return_requested_order_can_be_cancelled() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let user = UserId::new();
        let ctx = RequestContext::authenticated(user);
        let order = fx.place_order(user, PaymentMethod::Card).await;
        for status in [
            DeliveryStatus::Processing,
            DeliveryStatus::Shipped,
            DeliveryStatus::Delivered,
        ] {
            service.advance_delivery(order.id(), status).await.unwrap();
        }
        service.request_return(&ctx, order.id()).await.unwrap();

        let cancelled = service.cancel_order(&ctx, order.id()).await.unwrap();

        assert_eq!(cancelled.delivery_status(), DeliveryStatus::Cancelled);
        assert_eq!(
            cancelled.history().last().map(|change| change.status),
            Some(DeliveryStatus::Cancelled)
        );
        let err = service.approve_return(order.id()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn cancel_restocks_when_policy_says_so() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy {
            on_cancel: true,
            on_return: true,
        });
        let user = UserId::new();
        let order = fx.place_order(user, PaymentMethod::Card).await;

        service
            .cancel_order(&RequestContext::authenticated(user), order.id())
            .await
            .unwrap();

        assert_eq!(fx.lamp_stock().await, 10);
    }

    #[tokio::test]
    async fn approved_return_restocks() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let user = UserId::new();
        let ctx = RequestContext::authenticated(user);
        let order = fx.place_order(user, PaymentMethod::Card).await;

        let err = service.request_return(&ctx, order.id()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);

        for status in [
            DeliveryStatus::Processing,
            DeliveryStatus::Shipped,
            DeliveryStatus::Delivered,
        ] {
            service.advance_delivery(order.id(), status).await.unwrap();
        }
        service.request_return(&ctx, order.id()).await.unwrap();
        let returned = service.approve_return(order.id()).await.unwrap();

        assert_eq!(returned.delivery_status(), DeliveryStatus::Returned);
        assert_eq!(fx.lamp_stock().await, 10);
    }

    #[tokio::test]
    async fn failed_restock_transaction_changes_nothing() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy {
            on_cancel: true,
            on_return: true,
        });
        let user = UserId::new();
        let order = fx.place_order(user, PaymentMethod::Card).await;
        fx.store.set_fail_on_commit(true).await;

        let err = service
            .cancel_order(&RequestContext::authenticated(user), order.id())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransactionFailure);
        fx.store.set_fail_on_commit(false).await;
        let stored = service.find_order(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.delivery_status(), DeliveryStatus::Pending);
        assert_eq!(fx.lamp_stock().await, 8);
    }

    #[tokio::test]
    async fn cash_on_delivery_confirmation() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());
        let order = fx
            .place_order(UserId::new(), PaymentMethod::CashOnDelivery)
            .await;

        let confirmed = service.confirm_cash_on_delivery(order.id()).await.unwrap();

        assert_eq!(confirmed.delivery_status(), DeliveryStatus::Confirmed);
        assert_eq!(confirmed.payment_status(), PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let fx = Fixture::new().await;
        let service = fx.service(RestockPolicy::default());

        let err = service.approve_return(OrderId::new()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
