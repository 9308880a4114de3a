use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres, Row,
    postgres::{PgPoolOptions, PgRow},
};
use uuid::Uuid;

use crate::{
    Document, DocumentQuery, Result, SortOrder,
    document::validate_for_write,
    store::{DocumentStore, Transaction},
};

const UPSERT_SQL: &str = r#"
    INSERT INTO documents (collection, id, body, created_at, updated_at)
    VALUES ($1, $2, $3, $4, NOW())
    ON CONFLICT (collection, id) DO UPDATE SET
        body = EXCLUDED.body,
        updated_at = NOW()
"#;

/// PostgreSQL-backed document store implementation.
///
/// Every collection shares the `documents` table. Transactions map onto
/// database transactions and lock the rows they read with `FOR UPDATE`.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.run_migrations().await?;
        tracing::info!(max_connections, "connected to postgres document store");
        Ok(store)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            collection: row.try_get("collection")?,
            id: row.try_get("id")?,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT collection, id, body, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn put(&self, document: Document) -> Result<()> {
        validate_for_write(&document)?;

        sqlx::query(UPSERT_SQL)
            .bind(&document.collection)
            .bind(document.id)
            .bind(&document.body)
            .bind(document.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        let mut sql = String::from(
            "SELECT collection, id, body, created_at, updated_at FROM documents WHERE collection = $1",
        );
        let mut param_count = 1;

        for _ in &query.filters {
            sql.push_str(&format!(
                " AND body @> jsonb_build_object(${}::text, ${}::jsonb)",
                param_count + 1,
                param_count + 2
            ));
            param_count += 2;
        }

        match query.order {
            SortOrder::OldestFirst => sql.push_str(" ORDER BY created_at ASC, id ASC"),
            SortOrder::NewestFirst => sql.push_str(" ORDER BY created_at DESC, id DESC"),
        }

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql).bind(&query.collection);
        for filter in &query.filters {
            sqlx_query = sqlx_query.bind(&filter.field).bind(&filter.value);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

/// A database transaction over the `documents` table.
struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn get(&mut self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT collection, id, body, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(PostgresDocumentStore::row_to_document).transpose()
    }

    async fn put(&mut self, document: Document) -> Result<()> {
        validate_for_write(&document)?;

        sqlx::query(UPSERT_SQL)
            .bind(&document.collection)
            .bind(document.id)
            .bind(&document.body)
            .bind(document.created_at)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let Self { tx } = *self;
        tx.commit().await?;
        metrics::counter!("store_transactions_total", "outcome" => "committed").increment(1);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let Self { tx } = *self;
        tx.rollback().await?;
        metrics::counter!("store_transactions_total", "outcome" => "rolled_back").increment(1);
        tracing::debug!("postgres transaction rolled back");
        Ok(())
    }
}
