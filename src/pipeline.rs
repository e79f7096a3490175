// 🚚 Run Orchestrator
//
// One linear pass for one account:
//
//   INIT → EXPORT_VEHICLES → EXPORT_SCHEDULES → EXPORT_LOGS → WRITE_OUTPUT → DONE
//
// Any error moves the run to FAILED. DONE and FAILED both end in CLEANUP,
// which closes out the run log. The export file is written only after
// every exporter has succeeded, so a failed run leaves no output behind.

use crate::config::MigrationConfig;
use crate::entities::{
    RepairLog, ScheduledLog, ScheduledServiceInstance, ScheduledServiceType, Vehicle,
};
use crate::error::IdKind;
use crate::export::{export_logs, export_scheduled_services, export_vehicles, ExportContext};
use crate::ids::IdMap;
use crate::image::{HttpImageFetcher, ImageFetcher};
use crate::runlog::RunLog;
use crate::source::{DocumentStore, JsonDumpStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ============================================================================
// RUN STAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Init,
    ExportVehicles,
    ExportSchedules,
    ExportLogs,
    WriteOutput,
    Done,
    Failed,
    Cleanup,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Init => "INIT",
            RunStage::ExportVehicles => "EXPORT_VEHICLES",
            RunStage::ExportSchedules => "EXPORT_SCHEDULES",
            RunStage::ExportLogs => "EXPORT_LOGS",
            RunStage::WriteOutput => "WRITE_OUTPUT",
            RunStage::Done => "DONE",
            RunStage::Failed => "FAILED",
            RunStage::Cleanup => "CLEANUP",
        }
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn advance(stage: &mut RunStage, next: RunStage) {
    tracing::info!(from = %stage, to = %next, "migration stage");
    *stage = next;
}

// ============================================================================
// EXPORT DOCUMENT
// ============================================================================

/// The v2 export file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationExport {
    pub vehicles: Vec<Vehicle>,
    pub scheduled_service_types: Vec<ScheduledServiceType>,
    pub scheduled_service_instances: Vec<ScheduledServiceInstance>,
    pub scheduled_logs: Vec<ScheduledLog>,
    pub repair_logs: Vec<RepairLog>,
}

impl MigrationExport {
    /// Foreign keys that point at nothing in this export, as
    /// "<entity> <id>: <field> <target>" descriptions
    pub fn dangling_references(&self) -> Vec<String> {
        let vehicles: HashSet<&str> = self.vehicles.iter().map(|v| v.id.as_str()).collect();
        let types: HashSet<&str> = self
            .scheduled_service_types
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        let instances: HashSet<&str> = self
            .scheduled_service_instances
            .iter()
            .map(|i| i.id.as_str())
            .collect();

        let mut dangling = Vec::new();
        let mut check = |entity: &str, id: &str, field: &str, target: &str, known: &HashSet<&str>| {
            if !known.contains(target) {
                dangling.push(format!("{} {}: {} {}", entity, id, field, target));
            }
        };

        for i in &self.scheduled_service_instances {
            check("scheduledServiceInstance", &i.id, "vehicleId", &i.vehicle_id, &vehicles);
            check(
                "scheduledServiceInstance",
                &i.id,
                "scheduledServiceTypeId",
                &i.scheduled_service_type_id,
                &types,
            );
        }
        for l in &self.scheduled_logs {
            check("scheduledLog", &l.id, "vehicleId", &l.vehicle_id, &vehicles);
            check(
                "scheduledLog",
                &l.id,
                "scheduledServiceInstanceId",
                &l.scheduled_service_instance_id,
                &instances,
            );
        }
        for l in &self.repair_logs {
            check("repairLog", &l.id, "vehicleId", &l.vehicle_id, &vehicles);
        }

        dangling
    }

    /// Every id minted for this export, in array order
    pub fn all_ids(&self) -> Vec<&str> {
        self.vehicles
            .iter()
            .map(|v| v.id.as_str())
            .chain(self.scheduled_service_types.iter().map(|t| t.id.as_str()))
            .chain(self.scheduled_service_instances.iter().map(|i| i.id.as_str()))
            .chain(self.scheduled_logs.iter().map(|l| l.id.as_str()))
            .chain(self.repair_logs.iter().map(|l| l.id.as_str()))
            .collect()
    }

    /// Pretty JSON, four-space indented
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }

    /// Serialize fully in memory, then write in one go
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let content = self.to_pretty_json()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write export file: {}", path.display()))
    }
}

// ============================================================================
// RUN STATISTICS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub vehicles: usize,
    pub scheduled_service_types: usize,
    pub scheduled_service_instances: usize,
    pub scheduled_logs: usize,
    pub repair_logs: usize,
    pub skipped_scheduled_logs: usize,
}

impl RunStats {
    pub fn from_export(export: &MigrationExport, skipped_scheduled_logs: usize) -> Self {
        RunStats {
            vehicles: export.vehicles.len(),
            scheduled_service_types: export.scheduled_service_types.len(),
            scheduled_service_instances: export.scheduled_service_instances.len(),
            scheduled_logs: export.scheduled_logs.len(),
            repair_logs: export.repair_logs.len(),
            skipped_scheduled_logs,
        }
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} vehicles, {} service types, {} schedules, {} scheduled logs ({} skipped), {} repair logs",
            self.vehicles,
            self.scheduled_service_types,
            self.scheduled_service_instances,
            self.scheduled_logs,
            self.skipped_scheduled_logs,
            self.repair_logs
        )
    }

    fn write_to(&self, log: &mut RunLog) {
        log.line(format_args!("Num vehicles: {}", self.vehicles));
        log.line(format_args!("Num scheduled service types: {}", self.scheduled_service_types));
        log.line(format_args!(
            "Num scheduled service instances: {}",
            self.scheduled_service_instances
        ));
        log.line(format_args!("Num scheduled logs: {}", self.scheduled_logs));
        log.line(format_args!("Num repair logs: {}", self.repair_logs));
        log.line(format_args!("Num skipped scheduled logs: {}", self.skipped_scheduled_logs));
    }
}

// ============================================================================
// RUN
// ============================================================================

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunStats),
    Failed {
        /// Stage that was running when the error surfaced
        stage: RunStage,
        error: anyhow::Error,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

/// Run the migration for `email` as configured: v1 dump from
/// `config.source_path`, images over HTTP, log at `config.log_path`.
///
/// Only a log file that cannot be opened is returned as an error; everything
/// after that is reported through the outcome and the log.
pub fn run(email: &str, config: &MigrationConfig) -> Result<RunOutcome> {
    let mut log = RunLog::open(&config.log_path)?;
    let fetcher = HttpImageFetcher::new();

    let mut stage = RunStage::Init;
    let result = JsonDumpStore::open(&config.source_path)
        .and_then(|store| execute(email, &store, &fetcher, config, &mut log, &mut stage));

    Ok(finish(&mut log, stage, result))
}

/// Run the migration against explicit collaborators
pub fn run_migration(
    email: &str,
    store: &dyn DocumentStore,
    fetcher: &dyn ImageFetcher,
    config: &MigrationConfig,
    log: &mut RunLog,
) -> RunOutcome {
    let mut stage = RunStage::Init;
    let result = execute(email, store, fetcher, config, log, &mut stage);
    finish(log, stage, result)
}

fn execute(
    email: &str,
    store: &dyn DocumentStore,
    fetcher: &dyn ImageFetcher,
    config: &MigrationConfig,
    log: &mut RunLog,
    stage: &mut RunStage,
) -> Result<RunStats> {
    let ctx = ExportContext {
        store,
        owner_field: &config.owner_field,
        email,
        number_policy: config.number_policy,
        order: config.order,
    };
    let mut vehicle_ids = IdMap::new(IdKind::Vehicle);
    let mut type_ids = IdMap::new(IdKind::ScheduledServiceType);

    advance(stage, RunStage::ExportVehicles);
    let vehicles = export_vehicles(&ctx, fetcher, &mut vehicle_ids)?;

    advance(stage, RunStage::ExportSchedules);
    let schedules = export_scheduled_services(&ctx, &vehicle_ids, &mut type_ids)?;

    advance(stage, RunStage::ExportLogs);
    let logs = export_logs(&ctx, &vehicle_ids, &type_ids, &schedules.instances, log)?;

    let export = MigrationExport {
        vehicles,
        scheduled_service_types: schedules.types,
        scheduled_service_instances: schedules.instances,
        scheduled_logs: logs.scheduled,
        repair_logs: logs.repair,
    };

    let stats = RunStats::from_export(&export, logs.skipped);
    stats.write_to(log);

    advance(stage, RunStage::WriteOutput);
    let dangling = export.dangling_references();
    if !dangling.is_empty() {
        anyhow::bail!("Export has dangling references: {}", dangling.join("; "));
    }
    export.write_to(&config.output_path)?;
    log.line(format_args!("Wrote output data to {}", config.output_path.display()));

    Ok(stats)
}

fn finish(log: &mut RunLog, stage: RunStage, result: Result<RunStats>) -> RunOutcome {
    let outcome = match result {
        Ok(stats) => {
            tracing::info!(from = %stage, to = %RunStage::Done, "migration stage");
            tracing::info!("{}", stats.summary());
            RunOutcome::Completed(stats)
        }
        Err(error) => {
            tracing::info!(from = %stage, to = %RunStage::Failed, "migration stage");
            log.line(format_args!("ERROR during {}: {:?}", stage, error));
            RunOutcome::Failed { stage, error }
        }
    };

    tracing::info!(to = %RunStage::Cleanup, "migration stage");
    log.line("Exiting...");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::NumberPolicy;
    use crate::entities::TimeUnit;
    use crate::export::fixtures::{
        car, repair_log, scheduled_log, service_log, service_type, EchoFetcher, OWNER,
    };
    use crate::error::MigrationError;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    struct Harness {
        _dir: tempfile::TempDir,
        config: MigrationConfig,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = MigrationConfig {
                output_path: dir.path().join("out.json"),
                log_path: dir.path().join("migration_log.txt"),
                source_path: PathBuf::from("unused.json"),
                ..MigrationConfig::default()
            };
            Harness { _dir: dir, config }
        }

        fn run(&self, dump: Value) -> RunOutcome {
            self.run_with(dump, &EchoFetcher)
        }

        fn run_with(&self, dump: Value, fetcher: &dyn ImageFetcher) -> RunOutcome {
            let store = JsonDumpStore::from_value(dump).unwrap();
            let mut log = RunLog::open(&self.config.log_path).unwrap();
            run_migration(OWNER, &store, fetcher, &self.config, &mut log)
        }

        fn output(&self) -> MigrationExport {
            let content = std::fs::read_to_string(&self.config.output_path).unwrap();
            serde_json::from_str(&content).unwrap()
        }

        fn log(&self) -> String {
            std::fs::read_to_string(&self.config.log_path).unwrap()
        }
    }

    fn full_dump() -> Value {
        json!({
            "cars": [car("c1")],
            "scheduledServiceTypes": [service_type("t1", "Oil Change", &["c1"])],
            "serviceLogs": [service_log("d1", vec![scheduled_log("t1", "c1")], vec![repair_log("c1")])]
        })
    }

    #[test]
    fn test_end_to_end_single_of_each() {
        let h = Harness::new();
        let stats = match h.run(full_dump()) {
            RunOutcome::Completed(stats) => stats,
            other => panic!("run failed: {:?}", other),
        };
        assert_eq!(
            stats,
            RunStats {
                vehicles: 1,
                scheduled_service_types: 1,
                scheduled_service_instances: 1,
                scheduled_logs: 1,
                repair_logs: 1,
                skipped_scheduled_logs: 0,
            }
        );

        let export = h.output();
        assert_eq!(export.vehicles.len(), 1);
        assert_eq!(export.scheduled_service_types.len(), 1);
        assert_eq!(export.scheduled_service_instances.len(), 1);
        assert_eq!(export.scheduled_logs.len(), 1);
        assert_eq!(export.repair_logs.len(), 1);
        assert!(export.dangling_references().is_empty());

        let vehicle_id = &export.vehicles[0].id;
        let instance = &export.scheduled_service_instances[0];
        assert_eq!(&instance.vehicle_id, vehicle_id);
        assert_eq!(instance.scheduled_service_type_id, export.scheduled_service_types[0].id);
        assert_eq!(instance.time_units, TimeUnit::Month);
        assert_eq!(export.scheduled_logs[0].scheduled_service_instance_id, instance.id);
        assert_eq!(&export.repair_logs[0].vehicle_id, vehicle_id);
    }

    #[test]
    fn test_output_layout() {
        let h = Harness::new();
        assert!(h.run(full_dump()).is_completed());

        let raw = std::fs::read_to_string(&h.config.output_path).unwrap();
        assert!(raw.starts_with("{\n    \"vehicles\": ["));

        let value: Value = serde_json::from_str(&raw).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "vehicles",
                "scheduledServiceTypes",
                "scheduledServiceInstances",
                "scheduledLogs",
                "repairLogs"
            ]
        );
        assert!(raw.contains("\"timeUnits\": \"MONTH\""));
        assert!(!raw.contains("carId"));
    }

    #[test]
    fn test_log_records_counts_and_cleanup() {
        let h = Harness::new();
        assert!(h.run(full_dump()).is_completed());

        let log = h.log();
        assert!(log.contains("] Num vehicles: 1"));
        assert!(log.contains("] Num scheduled service types: 1"));
        assert!(log.contains("] Num scheduled service instances: 1"));
        assert!(log.contains("] Num scheduled logs: 1"));
        assert!(log.contains("] Num repair logs: 1"));
        assert!(log.contains("Wrote output data to"));
        assert!(log.lines().last().unwrap().ends_with("] Exiting..."));
    }

    #[test]
    fn test_ids_unique_across_run() {
        let h = Harness::new();
        let dump = json!({
            "cars": [car("c1"), car("c2"), car("c3")],
            "scheduledServiceTypes": [
                service_type("t1", "Oil Change", &["c1", "c2", "c3"]),
                service_type("t2", "Tire Rotation", &["c1", "c3"])
            ],
            "serviceLogs": [
                service_log("d1", vec![scheduled_log("t1", "c1"), scheduled_log("t2", "c3")], vec![repair_log("c2")]),
                service_log("d2", vec![scheduled_log("t1", "c2")], vec![repair_log("c1"), repair_log("c3")])
            ]
        });
        assert!(h.run(dump).is_completed());

        let export = h.output();
        let ids = export.all_ids();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 3 + 2 + 5 + 3 + 3);
        assert_eq!(unique.len(), ids.len());
        assert!(export.dangling_references().is_empty());
    }

    #[test]
    fn test_unmatched_scheduled_log_is_skipped_not_fatal() {
        let h = Harness::new();
        let dump = json!({
            "cars": [car("c1"), car("c2")],
            "scheduledServiceTypes": [service_type("t1", "Oil Change", &["c1"])],
            "serviceLogs": [service_log(
                "d1",
                vec![scheduled_log("t1", "c1"), scheduled_log("t1", "c2")],
                vec![]
            )]
        });

        let RunOutcome::Completed(stats) = h.run(dump) else {
            panic!("run should complete");
        };
        assert_eq!(stats.scheduled_logs, 1);
        assert_eq!(stats.skipped_scheduled_logs, 1);
        assert_eq!(h.output().scheduled_logs.len(), 1);
        assert!(h.log().contains("Not migrating log"));
    }

    #[test]
    fn test_incomplete_unmatched_scheduled_log_is_still_skipped() {
        let h = Harness::new();
        let mut unmatched = scheduled_log("t-unknown", "c1");
        unmatched.as_object_mut().unwrap().remove("notes");
        let dump = json!({
            "cars": [car("c1")],
            "scheduledServiceTypes": [service_type("t1", "Oil Change", &["c1"])],
            "serviceLogs": [service_log("d1", vec![unmatched, scheduled_log("t1", "c1")], vec![])]
        });

        let RunOutcome::Completed(stats) = h.run(dump) else {
            panic!("run should complete");
        };
        assert_eq!(stats.scheduled_logs, 1);
        assert_eq!(stats.skipped_scheduled_logs, 1);
        assert_eq!(h.output().scheduled_logs.len(), 1);
    }

    #[test]
    fn test_vehicle_missing_field_fails_without_output() {
        let h = Harness::new();
        let mut broken = car("c1");
        broken.as_object_mut().unwrap().remove("licensePlate");
        let dump = json!({ "cars": [broken] });

        let outcome = h.run(dump);

        match outcome {
            RunOutcome::Failed { stage, .. } => assert_eq!(stage, RunStage::ExportVehicles),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!h.config.output_path.exists());
        let log = h.log();
        assert!(log.contains("ERROR during EXPORT_VEHICLES"));
        assert!(log.contains("licensePlate"));
        assert!(log.lines().last().unwrap().ends_with("] Exiting..."));
    }

    #[test]
    fn test_schedule_for_foreign_vehicle_fails_run() {
        let h = Harness::new();
        let dump = json!({
            "cars": [car("c1")],
            "scheduledServiceTypes": [service_type("t1", "Oil Change", &["someone-elses-car"])]
        });

        match h.run(dump) {
            RunOutcome::Failed { stage, error } => {
                assert_eq!(stage, RunStage::ExportSchedules);
                assert!(matches!(
                    error.downcast_ref::<MigrationError>(),
                    Some(MigrationError::UnresolvedId { .. })
                ));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!h.config.output_path.exists());
    }

    #[test]
    fn test_image_failure_aborts_run() {
        struct Broken;
        impl ImageFetcher for Broken {
            fn fetch(&self, url: &str) -> Result<Vec<u8>> {
                Err(MigrationError::ImageStatus { url: url.to_string(), status: 500 }.into())
            }
        }

        let h = Harness::new();
        let outcome = h.run_with(full_dump(), &Broken);

        assert!(!outcome.is_completed());
        assert!(!h.config.output_path.exists());
        assert!(h.log().contains("HTTP 500"));
    }

    #[test]
    fn test_strict_numbers_abort_on_bad_cost() {
        let mut h = Harness::new();
        h.config.number_policy = NumberPolicy::Strict;

        // repair_log fixture carries totalCost "n/a"
        let outcome = h.run(full_dump());

        match outcome {
            RunOutcome::Failed { stage, .. } => assert_eq!(stage, RunStage::ExportLogs),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_account_writes_empty_export() {
        let h = Harness::new();
        assert!(h.run(json!({})).is_completed());

        assert_eq!(h.output(), MigrationExport::default());
    }

    #[test]
    fn test_run_with_missing_dump_fails_in_init() {
        let h = Harness::new();
        let config = MigrationConfig {
            source_path: h.config.output_path.with_file_name("does-not-exist.json"),
            ..h.config.clone()
        };

        let outcome = run(OWNER, &config).unwrap();
        match outcome {
            RunOutcome::Failed { stage, .. } => assert_eq!(stage, RunStage::Init),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_dangling_references_detected() {
        let export = MigrationExport {
            repair_logs: vec![RepairLog {
                id: "r1".to_string(),
                vehicle_id: "nowhere".to_string(),
                name: "x".to_string(),
                date_performed: String::new(),
                mileage: 0,
                labor_cost: 0.0,
                parts_cost: 0.0,
                total_cost: 0.0,
                notes: "<p></p>".to_string(),
            }],
            ..MigrationExport::default()
        };

        assert_eq!(export.dangling_references(), vec!["repairLog r1: vehicleId nowhere"]);
    }
}
