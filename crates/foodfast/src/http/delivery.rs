//! `/api/delivery` handlers.

use crate::delivery::{DeliveryRecord, StartDelivery};
use crate::http::{AppError, AppState, JsonBody};
use crate::model::{Drone, DroneCreate, DroneId, DroneUpdate, OrderId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/drones", get(idle_drones).post(register_drone))
        .route("/drones/{id}", put(update_drone))
        .route("/start-delivery", post(start_delivery))
        .route("/cancel-delivery/{order_id}", post(cancel_delivery))
}

async fn idle_drones(State(state): State<AppState>) -> Result<Json<Vec<Drone>>, AppError> {
    Ok(Json(state.delivery.idle_drones().await?))
}

async fn register_drone(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<DroneCreate>,
) -> Result<(StatusCode, Json<Drone>), AppError> {
    let drone = state.delivery.register_drone(params).await?;
    Ok((StatusCode::CREATED, Json(drone)))
}

async fn update_drone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<DroneUpdate>,
) -> Result<Json<Drone>, AppError> {
    let id: DroneId = id.parse()?;
    Ok(Json(state.delivery.update_drone_status(id, update).await?))
}

async fn start_delivery(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<StartDelivery>,
) -> Result<Json<Value>, AppError> {
    let record = state.delivery.start_delivery(request).await?;
    Ok(Json(json!({ "message": "Delivery started", "delivery": record })))
}

async fn cancel_delivery(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<DeliveryRecord>, AppError> {
    let order_id: OrderId = order_id.parse()?;
    Ok(Json(state.delivery.cancel_delivery(order_id).await?))
}
