// 🚗 Vehicle Entity

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Newly minted v2 id
    pub id: String,
    pub name: String,
    pub mileage: i64,
    pub year: i64,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub vin: String,
    /// Sanitized single-paragraph markup
    pub notes: String,
    /// Epoch millis at migration time
    pub date_created: i64,
    /// `data:image/jpeg;base64,...`
    pub base64_image: String,
}
