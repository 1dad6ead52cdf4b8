//! In-memory [`DocumentStore`] for tests.
//!
//! Honours unique indexes the way an ordered MongoDB insert does: documents
//! go in one by one and the first duplicate key stops the batch.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use parking_lot::Mutex;

use super::{DocumentStore, IndexSpec, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    indexes: Mutex<Vec<IndexSpec>>,
    closed: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Pre-populate a collection, bypassing indexes.
    pub fn seed(&self, collection: &str, documents: Vec<Document>) {
        self.collections
            .lock()
            .insert(collection.to_string(), documents);
    }

    pub fn indexes(&self) -> Vec<IndexSpec> {
        self.indexes.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }

    fn unique_key(spec: &IndexSpec, document: &Document) -> Vec<Bson> {
        spec.keys
            .iter()
            .map(|k| document.get(*k).cloned().unwrap_or(Bson::Null))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<(), StoreError> {
        let mut indexes = self.indexes.lock();
        if !indexes.contains(spec) {
            indexes.push(*spec);
        }
        Ok(())
    }

    async fn replace_all(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let unique: Vec<IndexSpec> = self
            .indexes
            .lock()
            .iter()
            .filter(|i| i.unique && i.collection == collection)
            .copied()
            .collect();

        let mut collections = self.collections.lock();
        let stored = collections.entry(collection.to_string()).or_default();
        stored.clear();

        let attempted = documents.len();
        for document in documents {
            for spec in &unique {
                let key = Self::unique_key(spec, &document);
                if stored.iter().any(|d| Self::unique_key(spec, d) == key) {
                    return Err(StoreError::PartialInsert {
                        collection: collection.to_string(),
                        inserted: stored.len(),
                        attempted,
                        message: format!("duplicate key {:?} for {:?}", key, spec.keys),
                    });
                }
            }
            stored.push(document);
        }
        Ok(stored.len())
    }

    async fn close(&self) {
        *self.closed.lock() = true;
    }
}
