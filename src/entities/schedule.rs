// 🗓️ Scheduled Service Types + Instances
//
// A type is the user's maintenance category ("Oil Change"). An instance
// binds one type to one vehicle with its intervals.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Day => "DAY",
            TimeUnit::Week => "WEEK",
            TimeUnit::Month => "MONTH",
            TimeUnit::Year => "YEAR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledServiceType {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledServiceInstance {
    pub id: String,
    /// v2 vehicle id
    pub vehicle_id: String,
    /// v2 scheduled service type id
    pub scheduled_service_type_id: String,
    pub mile_interval: i64,
    pub time_interval: i64,
    pub time_units: TimeUnit,
}

impl ScheduledServiceInstance {
    /// True if this instance binds the given (v2) vehicle and type
    pub fn binds(&self, vehicle_id: &str, scheduled_service_type_id: &str) -> bool {
        self.vehicle_id == vehicle_id && self.scheduled_service_type_id == scheduled_service_type_id
    }
}
