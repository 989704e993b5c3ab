use crate::geo::GeoPoint;
use crate::model::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Identifier of a fleet drone.
    DroneId,
    "drone"
);

/// Fleet status. The lowercase variants exist in older records and are still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DroneStatus {
    #[default]
    #[serde(rename = "IDLE")]
    Idle,
    #[serde(rename = "BUSY")]
    Busy,
    #[serde(rename = "MAINTENANCE")]
    Maintenance,
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "busy")]
    LegacyBusy,
}

impl DroneStatus {
    /// `IDLE` or the legacy `available`.
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle | Self::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    #[serde(rename = "_id")]
    pub id: DroneId,
    pub name: String,
    pub status: DroneStatus,
    pub battery: u8,
    pub current_order_id: Option<OrderId>,
    pub current_location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn full_battery() -> u8 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneCreate {
    pub name: String,
    #[serde(default)]
    pub status: DroneStatus,
    #[serde(default = "full_battery")]
    pub battery: u8,
    #[serde(default)]
    pub current_location: Option<GeoPoint>,
}

impl DroneCreate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DroneStatus::Idle,
            battery: full_battery(),
            current_location: None,
        }
    }
}

/// Operator update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroneUpdate {
    pub status: Option<DroneStatus>,
    pub order_id: Option<OrderId>,
    pub battery: Option<u8>,
    pub current_location: Option<GeoPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_status_strings_are_accepted() {
        let available: DroneStatus = serde_json::from_str("\"available\"").unwrap();
        let busy: DroneStatus = serde_json::from_str("\"busy\"").unwrap();
        assert!(available.is_idle());
        assert!(!busy.is_idle());
        assert!(serde_json::from_str::<DroneStatus>("\"FLYING\"").is_err());
    }
}
