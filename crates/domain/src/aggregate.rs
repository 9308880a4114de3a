//! Core aggregate trait.

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Trait for aggregates persisted as one document each.
///
/// An aggregate is a cluster of domain objects that is loaded and saved as a
/// single unit. Its whole state is the document body, so every invariant it
/// owns must be re-established before it is saved.
pub trait Aggregate: Serialize + DeserializeOwned + Send + Sync {
    /// Returns the collection the aggregate is stored in.
    fn collection() -> &'static str;

    /// Returns the document id of this aggregate.
    fn key(&self) -> Uuid;
}
