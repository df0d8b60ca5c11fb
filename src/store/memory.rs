// In-memory entity store.
//
// The default backend for local runs and tests. A single RwLock around the
// collection map makes `update_checked` a true compare-and-swap: version
// check and merge happen under the write lock.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value as JsonValue};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::entity_store::{Document, EntityStore, SortSpec, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn merge_fields(target: &mut JsonValue, patch: &JsonValue) -> Result<(), StoreError> {
    let patch = patch
        .as_object()
        .ok_or_else(|| StoreError::Serialization("update fields must be an object".to_string()))?;

    if !target.is_object() {
        *target = JsonValue::Object(Map::new());
    }
    let target = target.as_object_mut().expect("target coerced to object");

    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
    Ok(())
}

fn matches(doc: &Document, predicate: &JsonValue) -> bool {
    let Some(predicate) = predicate.as_object() else {
        return true;
    };
    predicate
        .iter()
        .all(|(key, value)| doc.fields.get(key) == Some(value))
}

fn sort_docs(docs: &mut [Document], sort: &Option<SortSpec>) {
    let Some(spec) = sort else {
        return;
    };
    docs.sort_by(|a, b| {
        let av = a.fields.get(&spec.field);
        let bv = b.fields.get(&spec.field);
        let ordering = compare_values(av, bv);
        if spec.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            } else if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
                x.cmp(y)
            } else {
                a.to_string().cmp(&b.to_string())
            }
        },
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create(
        &self,
        collection: &'static str,
        fields: JsonValue,
    ) -> Result<Document, StoreError> {
        if !fields.is_object() {
            return Err(StoreError::Serialization(
                "document fields must be an object".to_string(),
            ));
        }

        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            version: 1,
            created_at: now,
            updated_at: now,
            fields,
        };

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &'static str, id: &str) -> Result<Document, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    async fn update(
        &self,
        collection: &'static str,
        id: &str,
        fields: JsonValue,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        merge_fields(&mut doc.fields, &fields)?;
        doc.version += 1;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn update_checked(
        &self,
        collection: &'static str,
        id: &str,
        expected_version: u64,
        fields: JsonValue,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        if doc.version != expected_version {
            return Err(StoreError::VersionConflict {
                collection,
                id: id.to_string(),
                expected: expected_version,
                found: doc.version,
            });
        }

        merge_fields(&mut doc.fields, &fields)?;
        doc.version += 1;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &'static str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            }),
        }
    }

    async fn filter(
        &self,
        collection: &'static str,
        predicate: JsonValue,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches(doc, &predicate))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        sort_docs(&mut docs, &sort);
        if let Some(limit) = limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn list(
        &self,
        collection: &'static str,
        sort: Option<SortSpec>,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        self.filter(collection, JsonValue::Null, sort, limit).await
    }
}
