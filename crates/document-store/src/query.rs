use crate::Document;

/// Order in which query results are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest `created_at` first.
    #[default]
    OldestFirst,

    /// Newest `created_at` first.
    NewestFirst,
}

/// Equality filter on a top-level scalar field of the document body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// The body field to compare.
    pub field: String,

    /// The value the field must equal.
    pub value: serde_json::Value,
}

/// Builder for constructing document queries.
///
/// A query always targets one collection and may narrow it with field
/// equality filters, all of which must match.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    /// The collection to search.
    pub collection: String,

    /// Field filters (all must match).
    pub filters: Vec<FieldFilter>,

    /// Result ordering by creation time.
    pub order: SortOrder,

    /// Maximum number of documents to return.
    pub limit: Option<usize>,

    /// Number of documents to skip.
    pub offset: Option<usize>,
}

impl DocumentQuery {
    /// Creates a query over every document in a collection.
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Requires a body field to equal the given value.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Returns the newest documents first.
    pub fn newest_first(mut self) -> Self {
        self.order = SortOrder::NewestFirst;
        self
    }

    /// Limits the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips a number of results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the document satisfies the collection and every filter.
    pub fn matches(&self, document: &Document) -> bool {
        document.collection == self.collection
            && self
                .filters
                .iter()
                .all(|filter| document.field(&filter.field) == Some(&filter.value))
    }
}
