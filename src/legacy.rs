// 📜 v1 Record Shapes
//
// Typed views over v1 store documents. Every listed field is required:
// a document missing one fails to deserialize, which aborts the run.
// Fields the v1 clients stored inconsistently stay as raw JSON values and
// go through the coercion helpers.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Deserialize a store document into a typed v1 record
pub fn decode<T: DeserializeOwned>(data: &Map<String, Value>, what: &str) -> Result<T> {
    decode_value(&Value::Object(data.clone()), what)
}

/// Deserialize a nested entry (e.g. one scheduled log) into a typed v1 record
pub fn decode_value<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    T::deserialize(value).with_context(|| format!("Malformed v1 {} record", what))
}

/// `cars` collection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarV1 {
    pub car_id: String,
    pub name: Value,
    pub mileage: Value,
    pub year: Value,
    pub make: Value,
    pub model: Value,
    pub license_plate: Value,
    pub vin_number: Value,
    pub notes: Value,
    pub image_url: Value,
}

/// `scheduledServiceTypes` collection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeV1 {
    pub type_id: String,
    pub service_name: Value,
    /// v1 car id → schedule for that car, in stored order
    pub cars_scheduled: Map<String, Value>,
}

/// One entry of `carsScheduled`
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEntryV1 {
    pub miles: Value,
    pub time: ScheduleTimeV1,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleTimeV1 {
    pub quantity: Value,
    pub units: Value,
}

/// `serviceLogs` collection; one document holds both kinds of log.
/// Scheduled entries stay raw until they are matched to an instance, since
/// an unmatched entry is skipped whatever else it carries.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLogV1 {
    pub scheduled_log: Vec<Value>,
    pub repair_log: Vec<RepairLogV1>,
}

/// Just the references of a scheduled entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledLogRefV1 {
    pub sst_ref_id: String,
    pub car_reference_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledLogV1 {
    pub sst_ref_id: String,
    pub car_reference_id: String,
    pub date_performed: Value,
    pub mileage: Value,
    pub labor_cost: Value,
    pub parts_cost: Value,
    pub total_cost: Value,
    pub notes: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairLogV1 {
    pub car_reference_id: String,
    pub service_name: Value,
    pub date_performed: Value,
    pub mileage: Value,
    pub labor_cost: Value,
    pub parts_cost: Value,
    pub total_cost: Value,
    pub notes: Value,
}
