//! Error types for the Product actor and the catalogs built on it.

use actor_framework::FrameworkError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Product validation error: {0}")]
    ValidationError(String),

    /// The remote product service could not be reached or answered garbage.
    #[error("Product service unavailable: {0}")]
    Unavailable(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    pub fn from_framework(e: FrameworkError) -> Self {
        if let Some(inner) = e.entity_error::<ProductError>() {
            return inner.clone();
        }
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
