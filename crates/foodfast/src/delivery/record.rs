use crate::geo::{interpolate, GeoPoint};
use crate::model::{DroneId, OrderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightPhase {
    InFlight,
    Completed,
    Cancelled,
}

/// Everything needed to pick a flight back up after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub order_id: OrderId,
    pub drone_id: Option<DroneId>,
    /// Name shown to the customer and written onto the order.
    pub drone_label: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Percent of the route covered, 0 to 100.
    pub progress: u32,
    /// Percent added per tick.
    pub step: u32,
    pub phase: FlightPhase,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn position(&self) -> GeoPoint {
        interpolate(self.start, self.end, f64::from(self.progress))
    }

    pub fn arrived(&self) -> bool {
        self.progress >= 100
    }

    /// Moves one step along the route, stopping at 100.
    pub fn advance(&mut self) {
        self.progress = (self.progress + self.step.max(1)).min(100);
        self.updated_at = Utc::now();
    }

    pub fn set_phase(&mut self, phase: FlightPhase) {
        self.phase = phase;
        self.updated_at = Utc::now();
    }
}
