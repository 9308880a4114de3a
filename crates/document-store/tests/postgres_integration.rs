//! PostgreSQL integration tests
//!
//! These tests share one PostgreSQL container. Run with:
//!
//! ```bash
//! cargo test -p document-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use document_store::{Document, DocumentQuery, DocumentStore, PostgresDocumentStore};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_documents_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> PostgresDocumentStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE documents")
        .execute(&pool)
        .await
        .unwrap();

    PostgresDocumentStore::new(pool)
}

fn product(id: Uuid, quantity: u32) -> Document {
    Document::new(
        "products",
        id,
        serde_json::json!({"name": "Lamp", "quantity": quantity, "listed": true}),
    )
}

#[tokio::test]
async fn put_and_get_document() {
    let store = get_test_store().await;
    let id = Uuid::new_v4();

    store.put(product(id, 3)).await.unwrap();

    let doc = store.get("products", id).await.unwrap().unwrap();
    assert_eq!(doc.field("quantity"), Some(&serde_json::json!(3)));
    assert!(store.get("carts", id).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_keeps_created_at() {
    let store = get_test_store().await;
    let id = Uuid::new_v4();

    store.put(product(id, 3)).await.unwrap();
    let first = store.get("products", id).await.unwrap().unwrap();

    store.put(product(id, 1)).await.unwrap();
    let second = store.get("products", id).await.unwrap().unwrap();

    assert_eq!(first.created_at, second.created_at);
    assert_eq!(second.field("quantity"), Some(&serde_json::json!(1)));
}

#[tokio::test]
async fn query_with_filters_and_ordering() {
    let store = get_test_store().await;
    let owner = Uuid::new_v4().to_string();

    for i in 0..4u32 {
        let user = if i < 3 { owner.clone() } else { Uuid::new_v4().to_string() };
        store
            .put(Document::new(
                "orders",
                Uuid::new_v4(),
                serde_json::json!({"user_id": user, "seq": i}),
            ))
            .await
            .unwrap();
    }

    let newest = store
        .query(
            DocumentQuery::collection("orders")
                .field_eq("user_id", owner.as_str())
                .newest_first(),
        )
        .await
        .unwrap();
    assert_eq!(newest.len(), 3);
    assert!(newest[0].created_at >= newest[2].created_at);

    let page = store
        .query(
            DocumentQuery::collection("orders")
                .field_eq("user_id", owner.as_str())
                .limit(1)
                .offset(1),
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn transaction_commit_and_rollback() {
    let store = get_test_store().await;
    let kept = Uuid::new_v4();
    let discarded = Uuid::new_v4();

    let mut tx = store.begin().await.unwrap();
    tx.put(product(kept, 2)).await.unwrap();
    assert!(tx.get("products", kept).await.unwrap().is_some());
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    tx.put(product(discarded, 2)).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(store.get("products", kept).await.unwrap().is_some());
    assert!(store.get("products", discarded).await.unwrap().is_none());
}

#[tokio::test]
async fn locked_read_blocks_second_transaction() {
    let store = get_test_store().await;
    let id = Uuid::new_v4();
    store.put(product(id, 1)).await.unwrap();

    let mut first = store.begin().await.unwrap();
    first.get("products", id).await.unwrap().unwrap();

    let contender = {
        let store = store.clone();
        tokio::spawn(async move {
            let mut tx = store.begin().await.unwrap();
            let doc = tx.get("products", id).await.unwrap().unwrap();
            tx.commit().await.unwrap();
            doc
        })
    };

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!contender.is_finished());

    first.put(product(id, 0)).await.unwrap();
    first.commit().await.unwrap();

    let seen = contender.await.unwrap();
    assert_eq!(seen.field("quantity"), Some(&serde_json::json!(0)));
}
