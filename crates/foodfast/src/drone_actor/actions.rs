use crate::geo::GeoPoint;
use crate::model::OrderId;

#[derive(Debug, Clone, PartialEq)]
pub enum DroneAction {
    /// `BUSY`, carrying the given order.
    Dispatch { order_id: OrderId },
    /// Back to `IDLE` at the drop-off point, no order attached.
    Release { location: GeoPoint },
}
