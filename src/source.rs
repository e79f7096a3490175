// 🗄️ v1 Document Store
//
// The migration only ever reads from the v1 store, and only with one kind of
// query: "documents in collection X whose field F equals V". DocumentStore is
// that seam. JsonDumpStore answers it from a JSON export of the store.

use crate::error::MigrationError;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

// ============================================================================
// COLLECTIONS
// ============================================================================

pub const CARS: &str = "cars";
pub const SCHEDULED_SERVICE_TYPES: &str = "scheduledServiceTypes";
pub const SERVICE_LOGS: &str = "serviceLogs";

/// Key a dump may use to carry the store's own document id
pub const DOCUMENT_ID_KEY: &str = "_id";

// ============================================================================
// DOCUMENTS
// ============================================================================

/// One stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store document id
    pub id: String,
    /// Document fields
    pub data: Map<String, Value>,
}

/// Read-only query surface of the v1 store
pub trait DocumentStore {
    /// All documents in `collection` whose `field` equals `value`, in
    /// whatever order the store returns them.
    fn query(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>>;
}

// ============================================================================
// JSON DUMP STORE
// ============================================================================

/// Store backed by a JSON export: `{ "<collection>": [ {..doc..}, ... ] }`
///
/// Documents keep file order. A document's id comes from its `_id` key when
/// present, else its position in the collection array.
#[derive(Debug, Clone)]
pub struct JsonDumpStore {
    collections: Map<String, Value>,
}

impl JsonDumpStore {
    /// Load a dump file from disk
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read v1 dump: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse v1 dump: {}", path.display()))?;
        Self::from_value(value)
    }

    /// Build from an already-parsed dump
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(collections) => Ok(JsonDumpStore { collections }),
            _ => Err(anyhow::anyhow!("v1 dump must be a JSON object of collections")),
        }
    }

    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }
}

impl DocumentStore for JsonDumpStore {
    fn query(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>> {
        let docs = match self.collections.get(collection) {
            // An unknown collection reads as empty, same as the live store
            None => return Ok(Vec::new()),
            Some(Value::Array(docs)) => docs,
            Some(_) => return Err(MigrationError::InvalidCollection(collection.to_string()).into()),
        };

        let mut matches = Vec::new();
        for (position, doc) in docs.iter().enumerate() {
            let Value::Object(data) = doc else {
                return Err(MigrationError::InvalidCollection(collection.to_string()).into());
            };

            if data.get(field).and_then(Value::as_str) != Some(value) {
                continue;
            }

            let id = match data.get(DOCUMENT_ID_KEY) {
                Some(Value::String(id)) => id.clone(),
                _ => position.to_string(),
            };

            matches.push(Document {
                id,
                data: data.clone(),
            });
        }

        tracing::debug!(collection, matched = matches.len(), "queried v1 collection");
        Ok(matches)
    }
}
