//! # Flight Simulator
//!
//! One tokio task per flight, with no cap on how many fly at once. The simulator keeps
//! the task handles so a flight can be cancelled and a second flight for the same order
//! refused. The flight table is only locked for bookkeeping, never across a call to
//! another service, so a slow collaborator holds up only the flight it belongs to.
//!
//! A resumed flight must still belong to its order: if the order is gone, has moved
//! past the flight, or names another drone, the flight is cancelled instead.
//!
//! Every outbound call a flight makes (drone bookkeeping, order write-back, position
//! events) is best effort: failures are logged with the order id and the flight keeps
//! going.

use crate::clients::{DroneClient, OrderStatusCallback};
use crate::delivery::{DeliveryError, DeliveryRecord, DeliveryStore, FlightPhase};
use crate::geo::GeoPoint;
use crate::model::{DroneId, OrderId, OrderStatus};
use crate::notify::{Event, Notifier, DELIVERY_CANCELLED, STATUS_UPDATE};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightSettings {
    pub step_percent: u32,
    pub tick: Duration,
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self {
            step_percent: 5,
            tick: Duration::from_millis(1500),
        }
    }
}

/// What to do with flights found `IN_FLIGHT` at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPolicy {
    /// Continue from the saved progress.
    #[default]
    Resume,
    /// Mark cancelled, release the drone and tell the order room.
    Cancel,
}

impl FromStr for RecoveryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resume" => Ok(Self::Resume),
            "cancel" => Ok(Self::Cancel),
            other => Err(format!("expected `resume` or `cancel`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub resumed: Vec<OrderId>,
    /// Cancelled because the policy said so.
    pub cancelled: Vec<OrderId>,
    /// Cancelled under `Resume` because the order no longer waits for this flight.
    pub orphaned: Vec<OrderId>,
}

/// A flight about to start.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    pub order_id: OrderId,
    pub drone_id: Option<DroneId>,
    pub drone_label: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
}

enum Flight {
    /// Slot taken while `start` talks to the drone and order services.
    Starting,
    Flying(JoinHandle<()>),
}

impl Flight {
    fn is_active(&self) -> bool {
        match self {
            Flight::Starting => true,
            Flight::Flying(handle) => !handle.is_finished(),
        }
    }
}

struct Shared {
    settings: FlightSettings,
    notifier: Arc<dyn Notifier>,
    orders: Arc<dyn OrderStatusCallback>,
    drones: DroneClient,
    store: Arc<dyn DeliveryStore>,
    flights: Mutex<HashMap<OrderId, Flight>>,
}

#[derive(Clone)]
pub struct DeliverySimulator {
    shared: Arc<Shared>,
}

impl DeliverySimulator {
    pub fn new(
        settings: FlightSettings,
        notifier: Arc<dyn Notifier>,
        orders: Arc<dyn OrderStatusCallback>,
        drones: DroneClient,
        store: Arc<dyn DeliveryStore>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                settings,
                notifier,
                orders,
                drones,
                store,
                flights: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Dispatches the drone, hands the order to it and takes off.
    ///
    /// The drone and order updates are best effort; only a duplicate flight or a store
    /// failure stops the start.
    #[instrument(skip(self, plan), fields(order_id = %plan.order_id, drone = %plan.drone_label))]
    pub async fn start(&self, plan: FlightPlan) -> Result<DeliveryRecord, DeliveryError> {
        let order_id = plan.order_id;
        {
            let mut flights = self.shared.flights.lock().await;
            if flights.get(&order_id).is_some_and(Flight::is_active) {
                return Err(DeliveryError::AlreadyInFlight(order_id));
            }
            flights.insert(order_id, Flight::Starting);
        }

        // detached, so a caller that stops waiting cannot strand the reserved slot
        tokio::spawn(self.clone().launch(plan)).await?
    }

    async fn launch(self, plan: FlightPlan) -> Result<DeliveryRecord, DeliveryError> {
        let order_id = plan.order_id;
        let record = match self.prepare(plan).await {
            Ok(record) => record,
            Err(e) => {
                self.shared.flights.lock().await.remove(&order_id);
                return Err(e);
            }
        };

        let mut flights = self.shared.flights.lock().await;
        match flights.get(&order_id) {
            Some(Flight::Starting) => {
                info!(%order_id, start = ?record.start, end = ?record.end, "Flight started");
                let handle = tokio::spawn(self.clone().fly(record.clone()));
                flights.insert(order_id, Flight::Flying(handle));
            }
            // halted while preparing; the saved record is left for recovery
            _ => info!(%order_id, "Simulator halted before take-off"),
        }
        Ok(record)
    }

    /// Outbound calls and the first save for a new flight.
    async fn prepare(&self, plan: FlightPlan) -> Result<DeliveryRecord, DeliveryError> {
        if let Some(drone) = plan.drone_id {
            if let Err(e) = self.shared.drones.dispatch(drone, plan.order_id).await {
                warn!(order_id = %plan.order_id, %drone, error = %e, "Could not mark drone busy");
            }
        }
        if let Err(e) = self
            .shared
            .orders
            .attach_drone(plan.order_id, plan.drone_label.clone())
            .await
        {
            warn!(order_id = %plan.order_id, error = %e, "Could not assign drone to order");
        }
        if let Err(e) = self
            .shared
            .orders
            .write_status(plan.order_id, OrderStatus::Delivering)
            .await
        {
            warn!(order_id = %plan.order_id, error = %e, "Could not mark order delivering");
        }

        let now = Utc::now();
        let record = DeliveryRecord {
            order_id: plan.order_id,
            drone_id: plan.drone_id,
            drone_label: plan.drone_label,
            start: plan.start,
            end: plan.end,
            progress: 0,
            step: self.shared.settings.step_percent,
            phase: FlightPhase::InFlight,
            started_at: now,
            updated_at: now,
        };
        self.shared.store.save(&record).await?;
        Ok(record)
    }

    /// Stops a flight where it is and releases its drone.
    #[instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<DeliveryRecord, DeliveryError> {
        let handle = {
            let mut flights = self.shared.flights.lock().await;
            match flights.remove(&order_id) {
                Some(Flight::Flying(handle)) => handle,
                Some(Flight::Starting) => {
                    // not airborne yet; leave the slot to its `start`
                    flights.insert(order_id, Flight::Starting);
                    return Err(DeliveryError::NotInFlight(order_id));
                }
                None => return Err(DeliveryError::NotInFlight(order_id)),
            }
        };
        handle.abort();
        // wait for the task to stop so its last save cannot land after ours
        let _ = handle.await;

        let mut record = self
            .shared
            .store
            .load(order_id)
            .await?
            .ok_or(DeliveryError::NotInFlight(order_id))?;
        self.mark_cancelled(&mut record).await?;
        Ok(record)
    }

    /// Resumes or cancels every flight the store still has in the air.
    pub async fn recover(&self, policy: RecoveryPolicy) -> Result<RecoveryReport, DeliveryError> {
        let mut report = RecoveryReport::default();
        for mut record in self.shared.store.in_flight().await? {
            let order_id = record.order_id;
            match policy {
                RecoveryPolicy::Resume => {
                    if self.shared.flights.lock().await.contains_key(&order_id) {
                        continue;
                    }
                    if !self.order_awaits(&record).await {
                        self.mark_cancelled(&mut record).await?;
                        report.orphaned.push(order_id);
                        continue;
                    }
                    let mut flights = self.shared.flights.lock().await;
                    if flights.contains_key(&order_id) {
                        continue;
                    }
                    info!(%order_id, progress = record.progress, "Resuming flight");
                    flights.insert(order_id, Flight::Flying(tokio::spawn(self.clone().fly(record))));
                    report.resumed.push(order_id);
                }
                RecoveryPolicy::Cancel => {
                    info!(order_id = %record.order_id, progress = record.progress, "Cancelling interrupted flight");
                    self.mark_cancelled(&mut record).await?;
                    report.cancelled.push(record.order_id);
                }
            }
        }
        Ok(report)
    }

    /// Stops every flight task without touching the records, so the next start's
    /// recovery finds them still in flight.
    pub async fn halt(&self) {
        let flights: Vec<(OrderId, Flight)> = self.shared.flights.lock().await.drain().collect();
        for (order_id, flight) in flights {
            if let Flight::Flying(handle) = flight {
                handle.abort();
                let _ = handle.await;
            }
            debug!(%order_id, "Flight halted");
        }
    }

    pub async fn is_in_flight(&self, order_id: OrderId) -> bool {
        self.shared
            .flights
            .lock()
            .await
            .get(&order_id)
            .is_some_and(Flight::is_active)
    }

    /// Whether the order is still assigned to this flight's drone and not yet delivered.
    async fn order_awaits(&self, record: &DeliveryRecord) -> bool {
        let order_id = record.order_id;
        match self.shared.orders.progress(order_id).await {
            Ok(Some(order)) if order.awaits_flight(&record.drone_label) => true,
            Ok(Some(order)) => {
                warn!(%order_id, status = %order.status, drone = ?order.drone_id, "Order no longer waits for this flight");
                false
            }
            Ok(None) => {
                warn!(%order_id, "Order of interrupted flight is gone");
                false
            }
            Err(e) => {
                warn!(%order_id, error = %e, "Could not check order of interrupted flight");
                false
            }
        }
    }

    async fn fly(self, mut record: DeliveryRecord) {
        let order_id = record.order_id;

        while !record.arrived() {
            tokio::time::sleep(self.shared.settings.tick).await;
            record.advance();

            if let Err(e) = self.shared.store.save(&record).await {
                warn!(%order_id, error = %e, "Could not persist flight progress");
            }

            let status = if record.arrived() {
                OrderStatus::Delivered
            } else {
                OrderStatus::Delivering
            };
            let event = Event::to_room(
                STATUS_UPDATE,
                order_id.to_string(),
                json!({
                    "status": status,
                    "location": record.position(),
                    "droneId": record.drone_label,
                    "progress": record.progress,
                }),
            );
            if let Err(e) = self.shared.notifier.emit(event).await {
                warn!(%order_id, progress = record.progress, error = %e, "Position update lost");
            }
        }

        if let Err(e) = self
            .shared
            .orders
            .write_status(order_id, OrderStatus::Delivered)
            .await
        {
            warn!(%order_id, error = %e, "Could not mark order delivered");
        }
        if let Some(drone) = record.drone_id {
            if let Err(e) = self.shared.drones.release(drone, record.end).await {
                warn!(%order_id, %drone, error = %e, "Could not release drone");
            }
        }
        record.set_phase(FlightPhase::Completed);
        if let Err(e) = self.shared.store.save(&record).await {
            warn!(%order_id, error = %e, "Could not persist flight completion");
        }
        info!(%order_id, "Flight completed");

        self.shared.flights.lock().await.remove(&order_id);
    }

    async fn mark_cancelled(&self, record: &mut DeliveryRecord) -> Result<(), DeliveryError> {
        record.set_phase(FlightPhase::Cancelled);
        self.shared.store.save(record).await?;

        let location = record.position();
        if let Some(drone) = record.drone_id {
            if let Err(e) = self.shared.drones.release(drone, location).await {
                warn!(order_id = %record.order_id, %drone, error = %e, "Could not release drone");
            }
        }
        let event = Event::to_room(
            DELIVERY_CANCELLED,
            record.order_id.to_string(),
            json!({
                "orderId": record.order_id,
                "droneId": record.drone_label,
                "progress": record.progress,
                "location": location,
            }),
        );
        if let Err(e) = self.shared.notifier.emit(event).await {
            warn!(order_id = %record.order_id, error = %e, "Cancellation notice lost");
        }
        info!(order_id = %record.order_id, progress = record.progress, "Flight cancelled");
        Ok(())
    }
}
