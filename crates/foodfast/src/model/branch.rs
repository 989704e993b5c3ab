use crate::geo::{GeoJsonPoint, GeoPoint};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPERATING_HOURS: &str = "9:00 AM - 10:00 PM";

fn default_operating_hours() -> String {
    DEFAULT_OPERATING_HOURS.to_string()
}

/// A restaurant branch. Orders reference it by a loose `branchId` string; deliveries
/// use its location as the default departure point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    pub location: GeoJsonPoint,
    #[serde(default = "default_operating_hours")]
    pub operating_hours: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl Branch {
    pub fn origin(&self) -> GeoPoint {
        self.location.0
    }
}
