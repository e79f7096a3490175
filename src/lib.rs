// AutoHub v1 → v2 Account Migration - Core Library
// Exposes the pipeline for the CLI and for tests

pub mod ids;
pub mod coerce;
pub mod image;
pub mod legacy;
pub mod source;
pub mod entities;
pub mod export;
pub mod runlog;
pub mod pipeline;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use ids::{mint_id, IdMap};
pub use coerce::{
    normalize_time_unit, parse_float, parse_int, sanitize_notes, stringify, NumberPolicy,
};
pub use image::{fetch_image_as_data_uri, to_jpeg_data_uri, HttpImageFetcher, ImageFetcher};
pub use source::{Document, DocumentStore, JsonDumpStore};
pub use entities::{
    RepairLog, ScheduledLog, ScheduledServiceInstance, ScheduledServiceType, TimeUnit, Vehicle,
};
pub use runlog::RunLog;
pub use pipeline::{run, run_migration, MigrationExport, RunOutcome, RunStage, RunStats};
pub use config::{MigrationConfig, SourceOrder};
pub use error::{IdKind, MigrationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
