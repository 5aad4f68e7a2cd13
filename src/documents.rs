//! Document store port and annotation snapshots persisted through it.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::User;
use crate::constants::store::ANNOTATIONS_COLLECTION;
use crate::data::{AnnotationText, RowId, ZipCode};
use crate::errors::StoreError;
use crate::source::RowStore;
use crate::types::{CollectionName, DocumentId};

/// Hosted document database capability.
pub trait DocumentStore: Send + Sync {
    /// Create or replace a document.
    fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;
    /// Fetch a document; `None` when absent.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;
    /// Every document in a collection, ordered by id.
    fn list(&self, collection: &str) -> Result<Vec<(DocumentId, Value)>, StoreError>;
}

/// Document store held in memory.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<BTreeMap<CollectionName, BTreeMap<DocumentId, Value>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn list(&self, collection: &str) -> Result<Vec<(DocumentId, Value)>, StoreError> {
        Ok(self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// One saved annotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAnnotation {
    pub row_id: RowId,
    /// ZIP code of the row when saved; restores skip rows that no longer match.
    pub zip_code: ZipCode,
    pub text: AnnotationText,
}

/// Sparse annotations of one user, persisted as a single document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSnapshot {
    pub saved_at: DateTime<Utc>,
    pub annotations: Vec<SavedAnnotation>,
}

impl AnnotationSnapshot {
    /// Capture the non-empty annotations of a store.
    pub fn capture(store: &RowStore) -> Self {
        let annotations = store
            .annotations()
            .into_iter()
            .filter_map(|(row_id, text)| {
                store.get(row_id).map(|row| SavedAnnotation {
                    row_id,
                    zip_code: row.zip_code.clone(),
                    text: text.to_string(),
                })
            })
            .collect();
        Self {
            saved_at: Utc::now(),
            annotations,
        }
    }

    /// Save under the user's email.
    pub fn save(&self, documents: &dyn DocumentStore, user: &User) -> Result<(), StoreError> {
        let document = serde_json::to_value(self)?;
        documents.put(ANNOTATIONS_COLLECTION, &user.email, document)?;
        info!(
            email = user.email.as_str(),
            annotations = self.annotations.len(),
            "saved annotation snapshot"
        );
        Ok(())
    }

    /// Load the user's snapshot, if one was saved.
    pub fn load(documents: &dyn DocumentStore, user: &User) -> Result<Option<Self>, StoreError> {
        documents
            .get(ANNOTATIONS_COLLECTION, &user.email)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StoreError::from)
    }

    /// Restore annotations whose row still carries the saved ZIP code.
    /// Returns how many were applied.
    pub fn apply_to(&self, store: &mut RowStore) -> usize {
        let mut applied = 0;
        for saved in &self.annotations {
            let matches = store
                .get(saved.row_id)
                .is_some_and(|row| row.zip_code == saved.zip_code);
            if matches && store.set_annotation(saved.row_id, saved.text.clone()) {
                applied += 1;
            } else {
                debug!(
                    row = saved.row_id.0,
                    zip = saved.zip_code.as_str(),
                    "skipping stale annotation"
                );
            }
        }
        applied
    }
}
