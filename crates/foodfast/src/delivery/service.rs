//! # Delivery Service
//!
//! The `/api/delivery` operations: fleet bookkeeping plus turning a loose
//! `start-delivery` request into a [`FlightPlan`].

use crate::clients::DroneClient;
use crate::delivery::{DeliveryError, DeliveryRecord, DeliverySimulator, FlightPlan};
use crate::drone_actor::DroneError;
use crate::geo::{GeoPoint, DEFAULT_DESTINATION, DEFAULT_ORIGIN};
use crate::model::{Branch, Drone, DroneCreate, DroneId, DroneUpdate, OrderId};
use actor_framework::ActorClient;
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Label used when the request names no drone, or one the fleet does not know.
pub const AUTO_DRONE_LABEL: &str = "Drone auto";

pub const SEED_FLEET: [&str; 2] = ["Drone Alpha 01", "Drone Beta 02"];

/// Body of `POST /api/delivery/start-delivery`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDelivery {
    pub order_id: OrderId,
    #[serde(default)]
    pub drone_id: Option<String>,
    #[serde(default)]
    pub start_location: Option<GeoPoint>,
    #[serde(default)]
    pub end_location: Option<GeoPoint>,
    #[serde(default)]
    pub branch: Option<Branch>,
}

#[derive(Clone)]
pub struct DeliveryService {
    drones: DroneClient,
    simulator: DeliverySimulator,
}

impl DeliveryService {
    pub fn new(drones: DroneClient, simulator: DeliverySimulator) -> Self {
        Self { drones, simulator }
    }

    pub fn simulator(&self) -> &DeliverySimulator {
        &self.simulator
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn start_delivery(&self, request: StartDelivery) -> Result<DeliveryRecord, DeliveryError> {
        let (drone_id, drone_label) = self.resolve_drone(request.drone_id.as_deref()).await;

        let start = request
            .start_location
            .or_else(|| request.branch.as_ref().map(Branch::origin))
            .unwrap_or(DEFAULT_ORIGIN);
        let end = request.end_location.unwrap_or(DEFAULT_DESTINATION);

        self.simulator
            .start(FlightPlan {
                order_id: request.order_id,
                drone_id,
                drone_label,
                start,
                end,
            })
            .await
    }

    pub async fn cancel_delivery(&self, order_id: OrderId) -> Result<DeliveryRecord, DeliveryError> {
        self.simulator.cancel(order_id).await
    }

    pub async fn idle_drones(&self) -> Result<Vec<Drone>, DroneError> {
        self.drones.idle().await
    }

    pub async fn update_drone_status(&self, id: DroneId, update: DroneUpdate) -> Result<Drone, DroneError> {
        self.drones.update_status(id, update).await
    }

    pub async fn register_drone(&self, params: DroneCreate) -> Result<Drone, DroneError> {
        self.drones.register(params).await
    }

    /// Registers the two starter drones at the default origin, unless the fleet already
    /// has members. Returns what was added.
    pub async fn seed_fleet(&self) -> Result<Vec<Drone>, DroneError> {
        if !self.drones.list().await?.is_empty() {
            return Ok(Vec::new());
        }
        let mut seeded = Vec::with_capacity(SEED_FLEET.len());
        for name in SEED_FLEET {
            let params = DroneCreate {
                current_location: Some(DEFAULT_ORIGIN),
                ..DroneCreate::named(name)
            };
            seeded.push(self.drones.register(params).await?);
        }
        info!(count = seeded.len(), "Seeded drone fleet");
        Ok(seeded)
    }

    /// Picks the fleet id and display name for a requested drone.
    async fn resolve_drone(&self, requested: Option<&str>) -> (Option<DroneId>, String) {
        let Some(raw) = requested.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return (None, AUTO_DRONE_LABEL.to_string());
        };
        let id: DroneId = match raw.parse() {
            Ok(id) => id,
            Err(_) => return (None, format!("Drone {raw}")),
        };
        match self.drones.get_drone(id).await {
            Ok(drone) => (Some(drone.id), drone.name),
            Err(DroneError::NotFound(_)) => {
                warn!(drone_id = %id, "Unknown drone requested, flying unassigned");
                (None, AUTO_DRONE_LABEL.to_string())
            }
            Err(e) => {
                warn!(drone_id = %id, error = %e, "Drone lookup failed");
                (Some(id), format!("Drone {raw}"))
            }
        }
    }
}
