use async_trait::async_trait;
use uuid::Uuid;

use crate::{Document, DocumentQuery, Result};

/// Core trait for document store implementations.
///
/// Single-document reads and writes go straight through the store. Writes
/// that must land together go through a [`Transaction`] obtained from
/// [`DocumentStore::begin`]. All implementations must be thread-safe.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Loads a document by collection and id.
    ///
    /// Returns None if the document doesn't exist.
    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>>;

    /// Inserts or replaces a document.
    ///
    /// Replacing keeps the stored `created_at` and advances `updated_at`.
    async fn put(&self, document: Document) -> Result<()>;

    /// Retrieves the documents matching a query.
    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>>;

    /// Starts a unit of work.
    ///
    /// Documents read through the transaction are locked against concurrent
    /// transactions until it commits or rolls back.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// A unit of work spanning several documents.
///
/// Writes are invisible to other readers until [`Transaction::commit`]
/// succeeds. Rolling back, or dropping the transaction without committing,
/// discards every write.
#[async_trait]
pub trait Transaction: Send {
    /// Loads and locks a document. Sees this transaction's own writes.
    async fn get(&mut self, collection: &str, id: Uuid) -> Result<Option<Document>>;

    /// Stages an insert or replacement of a document.
    async fn put(&mut self, document: Document) -> Result<()>;

    /// Makes every staged write visible atomically.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards every staged write.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
