// 🔧 Service Logs
//
// Scheduled logs point at the instance they fulfilled; repair logs are
// ad-hoc work with a free-form name and no schedule.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledLog {
    pub id: String,
    pub vehicle_id: String,
    pub scheduled_service_instance_id: String,
    /// Passed through from v1 as-is
    pub date_performed: String,
    pub mileage: i64,
    pub labor_cost: f64,
    pub parts_cost: f64,
    pub total_cost: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairLog {
    pub id: String,
    pub vehicle_id: String,
    pub name: String,
    pub date_performed: String,
    pub mileage: i64,
    pub labor_cost: f64,
    pub parts_cost: f64,
    pub total_cost: f64,
    pub notes: String,
}
