//! # Drone Client
use crate::drone_actor::{DroneAction, DroneError};
use crate::geo::GeoPoint;
use crate::model::{Drone, DroneCreate, DroneId, DroneUpdate, OrderId};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct DroneClient {
    inner: ResourceClient<Drone>,
}

impl DroneClient {
    pub fn new(inner: ResourceClient<Drone>) -> Self {
        Self { inner }
    }

    /// Adds a drone. Names are unique across the fleet.
    ///
    /// The uniqueness check reads the fleet first, so two concurrent registrations of
    /// the same name can both succeed.
    #[instrument(skip(self))]
    pub async fn register(&self, params: DroneCreate) -> Result<Drone, DroneError> {
        if self.list().await?.iter().any(|d| d.name == params.name) {
            return Err(DroneError::NameTaken(params.name));
        }
        let id = self
            .inner
            .create(params)
            .await
            .map_err(DroneError::from_framework)?;
        info!(drone_id = %id, "Drone registered");
        self.get_drone(id).await
    }

    pub async fn get_drone(&self, id: DroneId) -> Result<Drone, DroneError> {
        self.get(id)
            .await?
            .ok_or_else(|| DroneError::NotFound(id.to_string()))
    }

    /// Drones whose status is `IDLE` or the legacy `available`.
    pub async fn idle(&self) -> Result<Vec<Drone>, DroneError> {
        let mut fleet = self.list().await?;
        fleet.retain(|d| d.status.is_idle());
        Ok(fleet)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: DroneId, update: DroneUpdate) -> Result<Drone, DroneError> {
        self.inner
            .update(id, update)
            .await
            .map_err(DroneError::from_framework)
    }

    #[instrument(skip(self))]
    pub async fn dispatch(&self, id: DroneId, order_id: OrderId) -> Result<Drone, DroneError> {
        self.inner
            .perform_action(id, DroneAction::Dispatch { order_id })
            .await
            .map_err(DroneError::from_framework)
    }

    #[instrument(skip(self))]
    pub async fn release(&self, id: DroneId, location: GeoPoint) -> Result<Drone, DroneError> {
        self.inner
            .perform_action(id, DroneAction::Release { location })
            .await
            .map_err(DroneError::from_framework)
    }
}

#[async_trait]
impl ActorClient<Drone> for DroneClient {
    type Error = DroneError;

    fn inner(&self) -> &ResourceClient<Drone> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        DroneError::from_framework(e)
    }
}
