//! # Order Actor
//!
//! Owns every [`Order`] and applies lifecycle moves one request at a time, so two status
//! writes to the same order land in arrival order.
//!
//! - [`entity`]: pricing at creation and the action handlers
//! - [`transition`]: the status table and [`TransitionPolicy`]
//! - [`actions`]: [`OrderAction`]
//! - [`error`]: [`OrderError`]
//!
//! Notifications are not sent from here; [`OrderClient`](crate::clients::OrderClient)
//! emits them once the actor has answered.

pub mod actions;
pub mod entity;
pub mod error;
pub mod transition;

pub use actions::*;
pub use entity::OrderContext;
pub use error::*;
pub use transition::*;

use crate::model::{Order, OrderId};
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Order actor and its client.
pub fn new() -> (ResourceActor<Order>, ResourceClient<Order>) {
    numbered_after(None)
}

/// Creates an Order actor whose first order comes after `last`. Orders live in memory,
/// but delivery records outlive a restart and are keyed by order id.
pub fn numbered_after(last: Option<OrderId>) -> (ResourceActor<Order>, ResourceClient<Order>) {
    let first = last.map_or(1, |OrderId(n)| n.saturating_add(1));
    ResourceActor::starting_at(32, first)
}
