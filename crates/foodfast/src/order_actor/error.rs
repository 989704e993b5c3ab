//! Error types for the Order actor.

use crate::model::OrderStatus;
use actor_framework::FrameworkError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    /// A required field is missing or malformed.
    #[error("Order validation error: {0}")]
    ValidationError(String),

    /// The active transition policy refuses the requested move.
    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Not one requested product could be looked up, so there is nothing to charge for.
    #[error("None of the {requested} requested products could be priced")]
    NoResolvableItems { requested: usize },

    /// The order service behind `ORDER_SERVICE_URL` failed or refused the call.
    #[error("Order service call failed: {0}")]
    Remote(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// Recovers the entity's own error from a framework error, or classifies the
    /// runtime failure.
    pub fn from_framework(e: FrameworkError) -> Self {
        if let Some(inner) = e.entity_error::<OrderError>() {
            return inner.clone();
        }
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_errors_survive_the_actor_boundary() {
        let illegal = OrderError::IllegalTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Preparing,
        };
        let wrapped = FrameworkError::EntityError(Box::new(illegal.clone()));
        assert_eq!(OrderError::from_framework(wrapped), illegal);

        assert_eq!(
            OrderError::from_framework(FrameworkError::NotFound("order_4".into())),
            OrderError::NotFound("order_4".into())
        );
        assert!(matches!(
            OrderError::from_framework(FrameworkError::ActorClosed),
            OrderError::ActorCommunicationError(_)
        ));
    }
}
