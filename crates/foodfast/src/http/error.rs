use crate::delivery::DeliveryError;
use crate::drone_actor::DroneError;
use crate::model::{IdParseError, UnknownStatus};
use crate::notify::NotifyError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Drone(#[from] DroneError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl From<IdParseError> for AppError {
    fn from(e: IdParseError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<UnknownStatus> for AppError {
    fn from(e: UnknownStatus) -> Self {
        Self::BadRequest(e.to_string())
    }
}

fn drone_status(e: &DroneError) -> StatusCode {
    match e {
        DroneError::NotFound(_) => StatusCode::NOT_FOUND,
        DroneError::ValidationError(_) => StatusCode::BAD_REQUEST,
        DroneError::NameTaken(_) => StatusCode::CONFLICT,
        DroneError::ActorCommunicationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Order(e) => match e {
                OrderError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderError::ValidationError(_) => StatusCode::BAD_REQUEST,
                OrderError::IllegalTransition { .. } => StatusCode::CONFLICT,
                OrderError::NoResolvableItems { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                OrderError::Remote(_) | OrderError::ActorCommunicationError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Product(e) => match e {
                ProductError::NotFound(_) => StatusCode::NOT_FOUND,
                ProductError::ValidationError(_) => StatusCode::BAD_REQUEST,
                ProductError::Unavailable(_) | ProductError::ActorCommunicationError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Drone(e) => drone_status(e),
            AppError::Delivery(e) => match e {
                DeliveryError::AlreadyInFlight(_) => StatusCode::CONFLICT,
                DeliveryError::NotInFlight(_) => StatusCode::NOT_FOUND,
                DeliveryError::Drone(e) => drone_status(e),
                DeliveryError::Io(_) | DeliveryError::Codec(_) | DeliveryError::Launch(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
