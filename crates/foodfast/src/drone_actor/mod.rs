//! # Drone Actor
//!
//! The fleet. Drone status is never tied to an order automatically; the delivery
//! simulator dispatches and releases drones, and operators may overwrite status at will.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::model::Drone;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Drone actor and its client.
pub fn new() -> (ResourceActor<Drone>, ResourceClient<Drone>) {
    ResourceActor::new(32)
}
