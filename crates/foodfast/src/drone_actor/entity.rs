use crate::drone_actor::{DroneAction, DroneError};
use crate::model::{Drone, DroneCreate, DroneId, DroneStatus, DroneUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;

fn check_battery(battery: u8) -> Result<u8, DroneError> {
    if battery > 100 {
        return Err(DroneError::ValidationError(format!(
            "battery must be a percentage, got {battery}"
        )));
    }
    Ok(battery)
}

#[async_trait]
impl ActorEntity for Drone {
    type Id = DroneId;
    type Create = DroneCreate;
    type Update = DroneUpdate;
    type Action = DroneAction;
    type ActionResult = Drone;
    type Context = ();
    type Error = DroneError;

    fn from_create_params(id: DroneId, params: DroneCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(DroneError::ValidationError("name must not be empty".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            name: params.name,
            status: params.status,
            battery: check_battery(params.battery)?,
            current_order_id: None,
            current_location: params.current_location,
            created_at: now,
            updated_at: now,
        })
    }

    /// Absent fields are kept. An order id is attached but never cleared here.
    async fn on_update(&mut self, update: DroneUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(battery) = update.battery {
            self.battery = check_battery(battery)?;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(order_id) = update.order_id {
            self.current_order_id = Some(order_id);
        }
        if let Some(location) = update.current_location {
            self.current_location = Some(location);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    async fn handle_action(&mut self, action: DroneAction, _ctx: &()) -> Result<Drone, Self::Error> {
        match action {
            DroneAction::Dispatch { order_id } => {
                self.status = DroneStatus::Busy;
                self.current_order_id = Some(order_id);
            }
            DroneAction::Release { location } => {
                self.status = DroneStatus::Idle;
                self.current_order_id = None;
                self.current_location = Some(location);
            }
        }
        self.updated_at = Utc::now();
        Ok(self.clone())
    }
}
