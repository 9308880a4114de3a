use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::{
    Document, DocumentQuery, Result, SortOrder, StoreError,
    document::validate_for_write,
    store::{DocumentStore, Transaction},
};

type Key = (String, Uuid);

#[derive(Debug, Default)]
struct Faults {
    fail_on_commit: bool,
    fail_writes_to: Option<String>,
}

/// In-memory document store.
///
/// Transactions are serialized behind a single writer lock, so a
/// transaction's reads stay valid until it finishes. Non-transactional
/// writes take the same lock; calling [`DocumentStore::put`] while the
/// current task holds an open transaction on this store deadlocks.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<Key, Document>>>,
    writer: Arc<Mutex<()>>,
    faults: Arc<RwLock<Faults>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.documents
            .read()
            .await
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    /// Removes every document.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    /// Makes every subsequent transaction commit fail.
    pub async fn set_fail_on_commit(&self, fail: bool) {
        self.faults.write().await.fail_on_commit = fail;
    }

    /// Makes transactional writes to the given collection fail.
    pub async fn set_fail_writes_to(&self, collection: Option<&str>) {
        self.faults.write().await.fail_writes_to = collection.map(str::to_string);
    }
}

fn write_document(documents: &mut HashMap<Key, Document>, mut document: Document) {
    let key = (document.collection.clone(), document.id);
    document.updated_at = Utc::now();
    if let Some(existing) = documents.get(&key) {
        document.created_at = existing.created_at;
    }
    documents.insert(key, document);
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(collection.to_string(), id)).cloned())
    }

    async fn put(&self, document: Document) -> Result<()> {
        validate_for_write(&document)?;

        let _writer = self.writer.lock().await;
        let mut documents = self.documents.write().await;
        write_document(&mut documents, document);
        Ok(())
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut matched: Vec<_> = documents
            .values()
            .filter(|doc| query.matches(doc))
            .cloned()
            .collect();

        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        if query.order == SortOrder::NewestFirst {
            matched.reverse();
        }

        let offset = query.offset.unwrap_or(0);
        let matched = matched.into_iter().skip(offset);
        let matched = match query.limit {
            Some(limit) => matched.take(limit).collect(),
            None => matched.collect(),
        };

        Ok(matched)
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let guard = self.writer.clone().lock_owned().await;
        Ok(Box::new(InMemoryTransaction {
            documents: self.documents.clone(),
            faults: self.faults.clone(),
            staged: HashMap::new(),
            _writer: guard,
        }))
    }
}

/// Transaction over an [`InMemoryDocumentStore`].
///
/// Holds the store's writer lock for its whole lifetime.
struct InMemoryTransaction {
    documents: Arc<RwLock<HashMap<Key, Document>>>,
    faults: Arc<RwLock<Faults>>,
    staged: HashMap<Key, Document>,
    _writer: OwnedMutexGuard<()>,
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn get(&mut self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let key = (collection.to_string(), id);
        if let Some(staged) = self.staged.get(&key) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.documents.read().await.get(&key).cloned())
    }

    async fn put(&mut self, document: Document) -> Result<()> {
        validate_for_write(&document)?;

        if let Some(ref collection) = self.faults.read().await.fail_writes_to
            && *collection == document.collection
        {
            return Err(StoreError::Unavailable(format!(
                "writes to {collection} are failing"
            )));
        }

        self.staged
            .insert((document.collection.clone(), document.id), document);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.faults.read().await.fail_on_commit {
            metrics::counter!("store_transactions_total", "outcome" => "failed").increment(1);
            return Err(StoreError::Unavailable("commit failed".to_string()));
        }

        let staged_count = self.staged.len();
        let mut documents = self.documents.write().await;
        for (_, document) in self.staged {
            write_document(&mut documents, document);
        }

        metrics::counter!("store_transactions_total", "outcome" => "committed").increment(1);
        tracing::debug!(documents = staged_count, "in-memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        metrics::counter!("store_transactions_total", "outcome" => "rolled_back").increment(1);
        tracing::debug!(
            documents = self.staged.len(),
            "in-memory transaction rolled back"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(id: Uuid, stock: u32) -> Document {
        Document::new("widgets", id, serde_json::json!({"stock": stock}))
    }

    #[tokio::test]
    async fn put_and_get() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();

        store.put(widget(id, 5)).await.unwrap();

        let doc = store.get("widgets", id).await.unwrap().unwrap();
        assert_eq!(doc.field("stock"), Some(&serde_json::json!(5)));
        assert_eq!(store.document_count("widgets").await, 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get("widgets", Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_preserves_created_at() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();

        store.put(widget(id, 5)).await.unwrap();
        let first = store.get("widgets", id).await.unwrap().unwrap();

        store.put(widget(id, 4)).await.unwrap();
        let second = store.get("widgets", id).await.unwrap().unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.field("stock"), Some(&serde_json::json!(4)));
    }

    #[tokio::test]
    async fn same_id_in_different_collections_is_distinct() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();

        store.put(widget(id, 1)).await.unwrap();
        store
            .put(Document::new("gadgets", id, serde_json::json!({"stock": 9})))
            .await
            .unwrap();

        assert_eq!(store.document_count("widgets").await, 1);
        assert_eq!(store.document_count("gadgets").await, 1);
    }

    #[tokio::test]
    async fn query_filters_sorts_and_pages() {
        let store = InMemoryDocumentStore::new();
        for stock in 0..5u32 {
            let mut doc = widget(Uuid::new_v4(), stock);
            doc.body["colour"] = serde_json::json!(if stock % 2 == 0 { "red" } else { "blue" });
            store.put(doc).await.unwrap();
        }

        let red = store
            .query(DocumentQuery::collection("widgets").field_eq("colour", "red"))
            .await
            .unwrap();
        assert_eq!(red.len(), 3);

        let newest = store
            .query(DocumentQuery::collection("widgets").newest_first().limit(2))
            .await
            .unwrap();
        assert_eq!(newest.len(), 2);
        assert!(newest[0].created_at >= newest[1].created_at);

        let skipped = store
            .query(DocumentQuery::collection("widgets").offset(4))
            .await
            .unwrap();
        assert_eq!(skipped.len(), 1);
    }

    #[tokio::test]
    async fn transaction_commit_makes_writes_visible() {
        let store = InMemoryDocumentStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        tx.put(widget(a, 1)).await.unwrap();
        tx.put(widget(b, 2)).await.unwrap();

        // Staged writes are visible inside the transaction only.
        assert!(tx.get("widgets", a).await.unwrap().is_some());
        assert!(store.get("widgets", a).await.unwrap().is_none());

        tx.commit().await.unwrap();

        assert!(store.get("widgets", a).await.unwrap().is_some());
        assert!(store.get("widgets", b).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn transaction_rollback_discards_writes() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store.put(widget(id, 5)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.put(widget(id, 0)).await.unwrap();
        tx.rollback().await.unwrap();

        let doc = store.get("widgets", id).await.unwrap().unwrap();
        assert_eq!(doc.field("stock"), Some(&serde_json::json!(5)));
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes_and_releases_lock() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();

        {
            let mut tx = store.begin().await.unwrap();
            tx.put(widget(id, 1)).await.unwrap();
        }

        assert!(store.get("widgets", id).await.unwrap().is_none());
        // The writer lock must be free again.
        store.put(widget(id, 2)).await.unwrap();
    }

    #[tokio::test]
    async fn failing_commit_leaves_store_untouched() {
        let store = InMemoryDocumentStore::new();
        store.set_fail_on_commit(true).await;

        let mut tx = store.begin().await.unwrap();
        tx.put(widget(Uuid::new_v4(), 1)).await.unwrap();
        let result = tx.commit().await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.document_count("widgets").await, 0);
    }

    #[tokio::test]
    async fn failing_collection_write_is_reported() {
        let store = InMemoryDocumentStore::new();
        store.set_fail_writes_to(Some("widgets")).await;

        let mut tx = store.begin().await.unwrap();
        assert!(tx.put(widget(Uuid::new_v4(), 1)).await.is_err());
        tx.put(Document::new("gadgets", Uuid::new_v4(), serde_json::json!({})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn transactions_are_serialized() {
        let store = InMemoryDocumentStore::new();
        let id = Uuid::new_v4();
        store.put(widget(id, 1)).await.unwrap();

        let tx = store.begin().await.unwrap();

        let contender = {
            let store = store.clone();
            tokio::spawn(async move {
                let mut tx = store.begin().await.unwrap();
                let doc = tx.get("widgets", id).await.unwrap().unwrap();
                tx.commit().await.unwrap();
                doc
            })
        };

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        tx.rollback().await.unwrap();
        let seen = contender.await.unwrap();
        assert_eq!(seen.field("stock"), Some(&serde_json::json!(1)));
    }

    #[tokio::test]
    async fn invalid_documents_are_rejected() {
        let store = InMemoryDocumentStore::new();
        let result = store
            .put(Document::new("widgets", Uuid::new_v4(), serde_json::json!(42)))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidDocument(_))));
    }
}
