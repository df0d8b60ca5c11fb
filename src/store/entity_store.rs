// Generic document-style entity store contract.
//
// Every core component talks to the backing store through this minimal
// collection-oriented interface: create / get / update / delete / filter /
// list, with documents addressed by collection name and id. `update` merges
// a partial field set; `update_checked` is the compare-and-swap variant used
// for balance mutations so two concurrent writers cannot clobber each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: &'static str, id: String },

    #[error("version conflict on {collection}/{id}: expected {expected}, found {found}")]
    VersionConflict {
        collection: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// A stored document: opaque fields plus the envelope the store maintains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: JsonValue,
}

impl Document {
    /// Deserialize the document fields into a typed entity.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.fields.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Sort specification for filter/list queries.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a new document and return it with its envelope populated.
    async fn create(
        &self,
        collection: &'static str,
        fields: JsonValue,
    ) -> Result<Document, StoreError>;

    async fn get(&self, collection: &'static str, id: &str) -> Result<Document, StoreError>;

    /// Shallow-merge `fields` into the document. Last write wins.
    async fn update(
        &self,
        collection: &'static str,
        id: &str,
        fields: JsonValue,
    ) -> Result<Document, StoreError>;

    /// Shallow-merge `fields` only if the stored version still matches.
    async fn update_checked(
        &self,
        collection: &'static str,
        id: &str,
        expected_version: u64,
        fields: JsonValue,
    ) -> Result<Document, StoreError>;

    async fn delete(&self, collection: &'static str, id: &str) -> Result<(), StoreError>;

    /// Equality filter: every key in `predicate` must match the stored field.
    async fn filter(
        &self,
        collection: &'static str,
        predicate: JsonValue,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn list(
        &self,
        collection: &'static str,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;
}
