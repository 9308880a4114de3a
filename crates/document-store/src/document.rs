use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Result, StoreError};

/// A stored JSON document.
///
/// `created_at` is assigned on first insert and preserved by every later
/// write; `updated_at` moves forward on each write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The collection the document belongs to (e.g. "products", "carts").
    pub collection: String,

    /// Identifier, unique within the collection.
    pub id: Uuid,

    /// The document body. Always a JSON object.
    pub body: serde_json::Value,

    /// When the document was first written.
    pub created_at: DateTime<Utc>,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a new document stamped with the current time.
    pub fn new(collection: impl Into<String>, id: Uuid, body: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            collection: collection.into(),
            id,
            body,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a document by serializing a value.
    pub fn from_value<T: Serialize>(
        collection: impl Into<String>,
        id: Uuid,
        value: &T,
    ) -> Result<Self> {
        Ok(Self::new(collection, id, serde_json::to_value(value)?))
    }

    /// Deserializes the body into a concrete type.
    pub fn into_value<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.body)?)
    }

    /// Returns a top-level field of the body.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.body.get(name)
    }
}

/// Validates a document before it is written.
pub(crate) fn validate_for_write(document: &Document) -> Result<()> {
    if document.collection.trim().is_empty() {
        return Err(StoreError::InvalidDocument(
            "collection name must not be empty".to_string(),
        ));
    }

    if !document.body.is_object() {
        return Err(StoreError::InvalidDocument(format!(
            "body of {}/{} must be a JSON object",
            document.collection, document.id
        )));
    }

    Ok(())
}
