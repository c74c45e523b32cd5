use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::Document;

/// Selector is the key/value filter handed to the database's `_find` API.
///
/// Every field is an implicit equality match; an empty selector matches
/// every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(Map<String, Value>);

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality constraint on `field`
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Add an equality constraint only when a value is present
    pub fn with_optional(self, field: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with(field, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Whether a document satisfies every constraint of this selector
    pub fn matches(&self, document: &Document) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

/// Body of a `_find` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindQuery {
    pub selector: Selector,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl FindQuery {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}
