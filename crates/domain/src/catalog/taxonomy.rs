use common::{BrandId, CategoryId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::Aggregate;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub listed: bool,
    pub deleted: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description: description.into(),
            listed: true,
            deleted: false,
        }
    }

    /// Listed and not soft-deleted.
    pub fn is_active(&self) -> bool {
        self.listed && !self.deleted
    }
}

impl Aggregate for Category {
    fn collection() -> &'static str {
        "categories"
    }

    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub listed: bool,
    pub deleted: bool,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BrandId::new(),
            name: name.into(),
            listed: true,
            deleted: false,
        }
    }

    /// Listed and not soft-deleted.
    pub fn is_active(&self) -> bool {
        self.listed && !self.deleted
    }
}

impl Aggregate for Brand {
    fn collection() -> &'static str {
        "brands"
    }

    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}
