//! Typed access to aggregates over the document store.

use async_trait::async_trait;
use document_store::{Document, DocumentQuery, DocumentStore, Transaction};
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::error::DomainError;

/// Extension trait loading and saving aggregates through a document store.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Loads an aggregate by id. Returns None if it doesn't exist.
    async fn load<A: Aggregate>(&self, id: Uuid) -> Result<Option<A>, DomainError> {
        match self.get(A::collection(), id).await? {
            Some(document) => Ok(Some(document.into_value()?)),
            None => Ok(None),
        }
    }

    /// Inserts or replaces an aggregate.
    async fn save<A: Aggregate>(&self, aggregate: &A) -> Result<(), DomainError> {
        let document = Document::from_value(A::collection(), aggregate.key(), aggregate)?;
        self.put(document).await?;
        Ok(())
    }

    /// Loads every aggregate matching a query.
    async fn find<A: Aggregate>(&self, query: DocumentQuery) -> Result<Vec<A>, DomainError> {
        self.query(query)
            .await?
            .into_iter()
            .map(|document| document.into_value::<A>().map_err(DomainError::from))
            .collect()
    }
}

impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Extension trait loading and saving aggregates inside a transaction.
#[async_trait]
pub trait TransactionExt: Transaction {
    /// Loads and locks an aggregate by id.
    async fn load<A: Aggregate>(&mut self, id: Uuid) -> Result<Option<A>, DomainError> {
        match self.get(A::collection(), id).await? {
            Some(document) => Ok(Some(document.into_value()?)),
            None => Ok(None),
        }
    }

    /// Stages an insert or replacement of an aggregate.
    async fn save<A: Aggregate>(&mut self, aggregate: &A) -> Result<(), DomainError> {
        let document = Document::from_value(A::collection(), aggregate.key(), aggregate)?;
        self.put(document).await?;
        Ok(())
    }
}

impl<T: Transaction + ?Sized> TransactionExt for T {}
