//! Lifecycle moves on an [`Order`](crate::model::Order) beyond plain field updates.
//!
//! Every action returns the order as it stands afterwards, so the caller can notify
//! subscribers without a second read.

use crate::model::OrderStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Marks the order paid and moves it to `PAID_WAITING_PROCESS`.
    ConfirmPayment,
    /// Writes a status, subject to the actor's transition policy.
    SetStatus(OrderStatus),
    /// Attaches a drone label. Advances `READY_TO_SHIP` to `DRONE_ASSIGNED`.
    AssignDrone(String),
}
