//! # Delivery Simulation
//!
//! Simulated drone flights. A flight moves a fixed percentage along a straight line on
//! every tick, reports its position to the order's room, and marks the order delivered
//! on arrival.
//!
//! Progress is written to a [`DeliveryStore`] on every tick. On startup
//! [`DeliverySimulator::recover`] either resumes the flights that were in the air or
//! cancels them.
//!
//! - [`record`]: the persisted [`DeliveryRecord`]
//! - [`store`]: [`JsonFileStore`] and [`MemoryStore`]
//! - [`simulator`]: flight tasks, cancellation, recovery
//! - [`service`]: drone bookkeeping and the `start-delivery` entry point

pub mod record;
pub mod service;
pub mod simulator;
pub mod store;

pub use record::*;
pub use service::*;
pub use simulator::*;
pub use store::*;

use crate::drone_actor::DroneError;
use crate::model::OrderId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Order {0} already has a drone in the air")]
    AlreadyInFlight(OrderId),

    #[error("No flight in progress for order {0}")]
    NotInFlight(OrderId),

    #[error("Delivery store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Delivery record encoding error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error(transparent)]
    Drone(#[from] DroneError),

    #[error("Flight start task failed: {0}")]
    Launch(#[from] tokio::task::JoinError),
}
