pub mod query;
pub mod review;
pub mod selector;

pub use query::*;
pub use review::*;
pub use selector::*;

/// A database document: a JSON object, passed through untouched.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Identity of a stored document as reported by the database
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub rev: String,
}
