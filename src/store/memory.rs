use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::model::{Document, DocumentRef, FindQuery};
use crate::store::traits::DocumentStore;
use crate::store::{StoreError, StoreResult};

/// In-process document store keyed by database name.
///
/// Databases exist once created or seeded; querying an unknown one fails
/// the same way a remote service answers for a missing database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    databases: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_database(&self, db: &str) {
        self.databases.write().entry(db.to_string()).or_default();
    }

    /// Add documents as-is, creating the database if needed
    pub fn seed(&self, db: &str, documents: impl IntoIterator<Item = Document>) {
        self.databases
            .write()
            .entry(db.to_string())
            .or_default()
            .extend(documents);
    }

    pub fn len(&self, db: &str) -> usize {
        self.databases.read().get(db).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, db: &str) -> bool {
        self.len(db) == 0
    }

    fn missing(db: &str) -> StoreError {
        StoreError::NotFound(format!("Database '{}' does not exist.", db))
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self, db: &str) -> StoreResult<()> {
        if self.databases.read().contains_key(db) {
            Ok(())
        } else {
            Err(Self::missing(db))
        }
    }

    async fn find(&self, db: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        let databases = self.databases.read();
        let documents = databases.get(db).ok_or_else(|| Self::missing(db))?;
        let limit = query.limit.map_or(usize::MAX, |limit| limit as usize);

        Ok(documents
            .iter()
            .filter(|doc| query.selector.matches(doc))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all_docs(&self, db: &str) -> StoreResult<Vec<Document>> {
        let databases = self.databases.read();
        let documents = databases.get(db).ok_or_else(|| Self::missing(db))?;
        Ok(documents.clone())
    }

    async fn insert(&self, db: &str, mut document: Document) -> StoreResult<DocumentRef> {
        let mut databases = self.databases.write();
        let documents = databases.get_mut(db).ok_or_else(|| Self::missing(db))?;

        let id = match document.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };
        if documents
            .iter()
            .any(|doc| doc.get("_id").and_then(Value::as_str) == Some(id.as_str()))
        {
            return Err(StoreError::Conflict("Document update conflict.".to_string()));
        }
        let rev = format!("1-{}", uuid::Uuid::new_v4().simple());

        document.insert("_id".to_string(), Value::String(id.clone()));
        document.insert("_rev".to_string(), Value::String(rev.clone()));
        documents.push(document);

        Ok(DocumentRef { id, rev })
    }
}
