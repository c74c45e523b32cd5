use serde_json::Value;

use crate::model::Document;

/// Fields a posted review must carry, checked in this order
pub const REQUIRED_REVIEW_FIELDS: [&str; 8] = [
    "name",
    "dealership",
    "review",
    "purchase",
    "purchase_date",
    "car_make",
    "car_model",
    "car_year",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// Body is not a JSON object, or is an empty one
    InvalidJson,
    MissingField(&'static str),
}

impl std::fmt::Display for ReviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewError::InvalidJson => write!(f, "Invalid JSON data"),
            ReviewError::MissingField(field) => write!(f, "Missing required field: {}", field),
        }
    }
}

/// Check a posted review and hand back the document to store, unchanged.
pub fn validate_review(body: Value) -> Result<Document, ReviewError> {
    let document = match body {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(ReviewError::InvalidJson),
    };

    if let Some(missing) = REQUIRED_REVIEW_FIELDS
        .iter()
        .find(|field| !document.contains_key(**field))
    {
        return Err(ReviewError::MissingField(*missing));
    }

    Ok(document)
}
