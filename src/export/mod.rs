// 📤 Entity Exporters
//
// One exporter per v1 collection. Each one pulls the owner's documents,
// transforms them field by field, and rewrites foreign keys through the
// IdMaps produced by the exporters that ran before it:
//
//   vehicles → scheduled service types/instances → logs

pub mod vehicles;
pub mod schedules;
pub mod logs;

pub use logs::{export_logs, LogExport};
pub use schedules::{export_scheduled_services, ScheduleExport};
pub use vehicles::export_vehicles;

use crate::coerce::{stringify, NumberPolicy};
use crate::config::SourceOrder;
use crate::source::{Document, DocumentStore};
use anyhow::{Context, Result};

/// What every exporter needs to read its collection
pub struct ExportContext<'a> {
    pub store: &'a dyn DocumentStore,
    pub owner_field: &'a str,
    pub email: &'a str,
    pub number_policy: NumberPolicy,
    pub order: SourceOrder,
}

impl<'a> ExportContext<'a> {
    /// The owner's documents in `collection`.
    ///
    /// With `SourceOrder::SourceId` they are sorted by the `key_field` value
    /// (or the store document id when `key_field` is None).
    pub fn documents(&self, collection: &str, key_field: Option<&str>) -> Result<Vec<Document>> {
        let mut docs = self
            .store
            .query(collection, self.owner_field, self.email)
            .with_context(|| format!("Failed to query v1 collection '{}'", collection))?;

        if self.order == SourceOrder::SourceId {
            docs.sort_by_cached_key(|doc| match key_field {
                Some(field) => doc.data.get(field).map(stringify).unwrap_or_default(),
                None => doc.id.clone(),
            });
        }

        Ok(docs)
    }
}
