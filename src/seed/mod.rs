use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::model::Document;
use crate::store::MemoryStore;

/// Load a seed file of the form `{"<db>": [doc, ...], ...}` into the memory store.
///
/// Returns the number of documents loaded.
pub fn load_seed_file(store: &MemoryStore, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} is not valid JSON", path.display()))?;

    load_seed_data(store, value)
}

pub fn load_seed_data(store: &MemoryStore, seed: Value) -> Result<usize> {
    let Value::Object(databases) = seed else {
        bail!("Seed data must be an object keyed by database name");
    };

    let mut loaded = 0;
    for (db, documents) in databases {
        let Value::Array(documents) = documents else {
            bail!("Seed data for '{}' must be an array of documents", db);
        };

        let documents = documents
            .into_iter()
            .map(|doc| match doc {
                Value::Object(map) => Ok(map),
                _ => bail!("Seed data for '{}' contains a non-object document", db),
            })
            .collect::<Result<Vec<Document>>>()?;

        log::info!("Seeding {} documents into '{}'", documents.len(), db);
        loaded += documents.len();
        store.seed(&db, documents);
    }

    Ok(loaded)
}
