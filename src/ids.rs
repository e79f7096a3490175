// 🔑 Identifier Remapper
//
// v1 document keys are only meaningful inside the old store. Every migrated
// entity gets a fresh UUID, and the old→new pairs are kept here so later
// stages can rewrite their foreign keys.
//
// One IdMap per entity kind, owned by the orchestrator and handed to each
// exporter explicitly.

use crate::error::{IdKind, MigrationError};
use std::collections::HashMap;

/// Mint a new opaque identifier (UUID v4)
pub fn mint_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Old-id → new-id mapping for one entity kind, scoped to a single run
#[derive(Debug, Clone)]
pub struct IdMap {
    kind: IdKind,
    entries: HashMap<String, String>,
}

impl IdMap {
    pub fn new(kind: IdKind) -> Self {
        IdMap {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> IdKind {
        self.kind
    }

    /// Mint a new id for `old_id`, record the pair and return the new id.
    ///
    /// Old ids are expected to be unique within one user's data; if one
    /// repeats, the later mapping replaces the earlier one.
    pub fn new_id(&mut self, old_id: &str) -> String {
        let id = mint_id();
        if let Some(previous) = self.entries.insert(old_id.to_string(), id.clone()) {
            tracing::warn!(
                kind = %self.kind,
                old_id,
                previous = %previous,
                "duplicate v1 id, later mapping wins"
            );
        }
        id
    }

    /// Look up the new id minted for `old_id`
    pub fn resolve(&self, old_id: &str) -> Result<&str, MigrationError> {
        self.entries
            .get(old_id)
            .map(String::as_str)
            .ok_or_else(|| MigrationError::UnresolvedId {
                kind: self.kind,
                old_id: old_id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
