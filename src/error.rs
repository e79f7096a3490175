// ⚠️ Migration errors
//
// Everything fatal bubbles up as anyhow::Error to the orchestrator.
// The variants here exist for the cases a caller has to tell apart.

use thiserror::Error;

/// Which mapping an unresolved id was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Vehicle,
    ScheduledServiceType,
}

impl IdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Vehicle => "vehicle",
            IdKind::ScheduledServiceType => "scheduled service type",
        }
    }
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("no v2 {kind} id recorded for v1 id '{old_id}'")]
    UnresolvedId { kind: IdKind, old_id: String },

    #[error("collection '{0}' is not an array of documents")]
    InvalidCollection(String),

    #[error("failed to fetch image {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    #[error("image request {url} returned HTTP {status}")]
    ImageStatus { url: String, status: u16 },

    #[error("field '{field}' is not a valid number: {value}")]
    StrictNumber { field: String, value: String },
}
