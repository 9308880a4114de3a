//! Document persistence for the storefront.
//!
//! Documents are JSON bodies addressed by `(collection, id)`. A
//! [`DocumentStore`] serves single-document reads and writes, and hands out
//! [`Transaction`]s for multi-document units of work that either commit as a
//! whole or leave no trace.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use document::Document;
pub use error::{Result, StoreError};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::{DocumentQuery, FieldFilter, SortOrder};
pub use store::{DocumentStore, Transaction};
