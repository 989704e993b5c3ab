//! # Framework Errors

/// Errors raised by the actor runtime, or passed through it from an entity hook.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recovers the entity's own error type from an [`EntityError`](Self::EntityError).
    ///
    /// Returns `None` for runtime errors or when the boxed error is of another type.
    pub fn entity_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::EntityError(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("battery too low: {0}%")]
    struct BatteryLow(u8);

    #[test]
    fn entity_error_downcasts_to_the_original_type() {
        let err = FrameworkError::EntityError(Box::new(BatteryLow(7)));
        assert_eq!(err.entity_error::<BatteryLow>(), Some(&BatteryLow(7)));
        assert!(err.entity_error::<std::io::Error>().is_none());
    }

    #[test]
    fn runtime_errors_carry_no_entity_error() {
        let err = FrameworkError::NotFound("order_9".into());
        assert!(err.entity_error::<BatteryLow>().is_none());
        assert_eq!(err.to_string(), "Item not found: order_9");
    }
}
