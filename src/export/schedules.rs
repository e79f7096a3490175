// 🗓️ Scheduled service type + instance export
//
// Each `scheduledServiceTypes` document becomes one ScheduledServiceType plus
// one ScheduledServiceInstance per entry of its `carsScheduled` map. Every
// entry must point at a car exported earlier; an unknown car aborts the run.

use super::ExportContext;
use crate::coerce::{normalize_time_unit, stringify};
use crate::entities::{ScheduledServiceInstance, ScheduledServiceType};
use crate::ids::{mint_id, IdMap};
use crate::legacy::{decode, ScheduleEntryV1, ServiceTypeV1};
use crate::source::SCHEDULED_SERVICE_TYPES;
use anyhow::{Context, Result};

#[derive(Debug, Default)]
pub struct ScheduleExport {
    pub types: Vec<ScheduledServiceType>,
    pub instances: Vec<ScheduledServiceInstance>,
}

pub fn export_scheduled_services(
    ctx: &ExportContext,
    vehicle_ids: &IdMap,
    type_ids: &mut IdMap,
) -> Result<ScheduleExport> {
    let mut export = ScheduleExport::default();

    for doc in ctx.documents(SCHEDULED_SERVICE_TYPES, Some("typeId"))? {
        let sst: ServiceTypeV1 = decode(&doc.data, "scheduled service type")?;

        let service_type = ScheduledServiceType {
            id: type_ids.new_id(&sst.type_id),
            name: stringify(&sst.service_name),
        };

        for (v1_car_id, entry) in &sst.cars_scheduled {
            let instance = transform_entry(ctx, vehicle_ids, &service_type, v1_car_id, entry)
                .with_context(|| {
                    format!(
                        "Failed to migrate schedule of type {} for car {}",
                        sst.type_id, v1_car_id
                    )
                })?;
            export.instances.push(instance);
        }

        tracing::debug!(type_id = %sst.type_id, instances = sst.cars_scheduled.len(), "migrated service type");
        export.types.push(service_type);
    }

    Ok(export)
}

fn transform_entry(
    ctx: &ExportContext,
    vehicle_ids: &IdMap,
    service_type: &ScheduledServiceType,
    v1_car_id: &str,
    entry: &serde_json::Value,
) -> Result<ScheduledServiceInstance> {
    let entry: ScheduleEntryV1 = serde_json::from_value(entry.clone())
        .context("Malformed v1 schedule entry")?;

    Ok(ScheduledServiceInstance {
        id: mint_id(),
        vehicle_id: vehicle_ids.resolve(v1_car_id)?.to_string(),
        scheduled_service_type_id: service_type.id.clone(),
        mile_interval: ctx.number_policy.int("miles", &entry.miles)?,
        time_interval: ctx.number_policy.int("time.quantity", &entry.time.quantity)?,
        time_units: normalize_time_unit(Some(&entry.time.units)),
    })
}
