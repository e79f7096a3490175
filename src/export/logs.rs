// 🔧 Service log export
//
// A `serviceLogs` document carries two lists:
// - scheduledLog: work done against a schedule. Must land on an instance
//   built by the schedule export; if none matches, the entry is logged and
//   dropped, and the export carries on.
// - repairLog: ad-hoc work. Always emitted; its car must be known.

use super::ExportContext;
use crate::coerce::{sanitize_notes, stringify};
use crate::entities::{RepairLog, ScheduledLog, ScheduledServiceInstance};
use crate::ids::{mint_id, IdMap};
use crate::legacy::{
    decode, decode_value, RepairLogV1, ScheduledLogRefV1, ScheduledLogV1, ServiceLogV1,
};
use crate::runlog::RunLog;
use crate::source::SERVICE_LOGS;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;

#[derive(Debug, Default)]
pub struct LogExport {
    pub scheduled: Vec<ScheduledLog>,
    pub repair: Vec<RepairLog>,
    /// Scheduled entries dropped for lack of a matching instance
    pub skipped: usize,
}

pub fn export_logs(
    ctx: &ExportContext,
    vehicle_ids: &IdMap,
    type_ids: &IdMap,
    instances: &[ScheduledServiceInstance],
    log: &mut RunLog,
) -> Result<LogExport> {
    let mut export = LogExport::default();

    for doc in ctx.documents(SERVICE_LOGS, None)? {
        let service_log: ServiceLogV1 = decode(&doc.data, "service log")?;

        for raw in &service_log.scheduled_log {
            let refs: ScheduledLogRefV1 = decode_value(raw, "scheduled log")
                .with_context(|| format!("Bad scheduled log in document {}", doc.id))?;

            let Some(instance) = find_instance(&refs, vehicle_ids, type_ids, instances) else {
                log.line(format_args!(
                    "Could not find scheduled service instance while creating scheduled log. Not migrating log {}",
                    entry_json(raw)?
                ));
                export.skipped += 1;
                continue;
            };

            let scheduled = decode_value::<ScheduledLogV1>(raw, "scheduled log")
                .and_then(|entry| transform_scheduled(ctx, &entry, instance))
                .with_context(|| format!("Failed to migrate scheduled log in document {}", doc.id))?;
            export.scheduled.push(scheduled);
        }

        for entry in &service_log.repair_log {
            let repair = transform_repair(ctx, vehicle_ids, entry)
                .with_context(|| format!("Failed to migrate repair log in document {}", doc.id))?;
            export.repair.push(repair);
        }
    }

    Ok(export)
}

/// Single-line JSON with `", "` and `": "` separators, as the v1 tooling
/// printed skipped entries
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn entry_json(raw: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    raw.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)?)
}

/// The instance binding this entry's (vehicle, type) pair, if both ids
/// were migrated and such an instance exists
fn find_instance<'a>(
    entry: &ScheduledLogRefV1,
    vehicle_ids: &IdMap,
    type_ids: &IdMap,
    instances: &'a [ScheduledServiceInstance],
) -> Option<&'a ScheduledServiceInstance> {
    let vehicle_id = vehicle_ids.resolve(&entry.car_reference_id).ok()?;
    let type_id = type_ids.resolve(&entry.sst_ref_id).ok()?;
    instances.iter().find(|ssi| ssi.binds(vehicle_id, type_id))
}

fn transform_scheduled(
    ctx: &ExportContext,
    entry: &ScheduledLogV1,
    instance: &ScheduledServiceInstance,
) -> Result<ScheduledLog> {
    let policy = ctx.number_policy;
    Ok(ScheduledLog {
        id: mint_id(),
        vehicle_id: instance.vehicle_id.clone(),
        scheduled_service_instance_id: instance.id.clone(),
        date_performed: stringify(&entry.date_performed),
        mileage: policy.int("mileage", &entry.mileage)?,
        labor_cost: policy.float("laborCost", &entry.labor_cost)?,
        parts_cost: policy.float("partsCost", &entry.parts_cost)?,
        total_cost: policy.float("totalCost", &entry.total_cost)?,
        notes: sanitize_notes(&entry.notes),
    })
}

fn transform_repair(ctx: &ExportContext, vehicle_ids: &IdMap, entry: &RepairLogV1) -> Result<RepairLog> {
    let policy = ctx.number_policy;
    Ok(RepairLog {
        id: mint_id(),
        vehicle_id: vehicle_ids.resolve(&entry.car_reference_id)?.to_string(),
        name: stringify(&entry.service_name),
        date_performed: stringify(&entry.date_performed),
        mileage: policy.int("mileage", &entry.mileage)?,
        labor_cost: policy.float("laborCost", &entry.labor_cost)?,
        parts_cost: policy.float("partsCost", &entry.parts_cost)?,
        total_cost: policy.float("totalCost", &entry.total_cost)?,
        notes: sanitize_notes(&entry.notes),
    })
}
