// v2 Entity Models
//
// The shapes the v2 importer accepts. Each entity is built once by an
// exporter and never modified afterwards; the only way to "change" one is to
// not emit it.
//
// Field order here is the field order in the export file.

pub mod vehicle;
pub mod schedule;
pub mod log;

pub use vehicle::Vehicle;
pub use schedule::{ScheduledServiceInstance, ScheduledServiceType, TimeUnit};
pub use log::{RepairLog, ScheduledLog};
