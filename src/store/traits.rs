use crate::model::{Document, DocumentRef, FindQuery};
use crate::store::StoreResult;

/// Document database operations the HTTP handlers rely on.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check that `db` exists and the credentials are accepted
    async fn ping(&self, db: &str) -> StoreResult<()>;
    /// Run a selector query, returning the matching documents
    async fn find(&self, db: &str, query: &FindQuery) -> StoreResult<Vec<Document>>;
    /// Every document in `db`
    async fn all_docs(&self, db: &str) -> StoreResult<Vec<Document>>;
    /// Store a new document
    async fn insert(&self, db: &str, document: Document) -> StoreResult<DocumentRef>;
}
