//! Error types for the Drone actor.

use actor_framework::FrameworkError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DroneError {
    #[error("Drone not found: {0}")]
    NotFound(String),

    #[error("Drone validation error: {0}")]
    ValidationError(String),

    /// Fleet names are unique.
    #[error("A drone named {0:?} already exists")]
    NameTaken(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl DroneError {
    pub fn from_framework(e: FrameworkError) -> Self {
        if let Some(inner) = e.entity_error::<DroneError>() {
            return inner.clone();
        }
        match e {
            FrameworkError::NotFound(id) => DroneError::NotFound(id),
            other => DroneError::ActorCommunicationError(other.to_string()),
        }
    }
}
