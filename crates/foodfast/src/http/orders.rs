//! `/api/orders` handlers.
//!
//! Status writes go through the configured [`TransitionPolicy`]. The default is
//! `Enforced`: `PUT /{id}/status` may only advance one pipeline step (or cancel), and
//! `PUT /{id}/pay` only applies before the kitchen starts on the order. Anything else is
//! answered with `409 Conflict`. Set `FOODFAST_TRANSITION_POLICY=permissive` to accept
//! any write from any status, as older clients expect.
//!
//! Malformed bodies are `400` with the usual `{"message": ...}` shape.
//!
//! [`TransitionPolicy`]: crate::order_actor::TransitionPolicy

use crate::http::{AppError, AppState, JsonBody};
use crate::model::{Order, OrderCreate, OrderId, OrderStatus, OrderUpdate};
use crate::notify::{NotificationOutcome, Notified};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// An order plus the fate of the events its mutation emitted.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub notifications: Vec<NotificationOutcome>,
}

impl From<Notified<Order>> for OrderResponse {
    fn from(notified: Notified<Order>) -> Self {
        Self {
            order: notified.value,
            notifications: notified.notifications,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchFilter {
    pub branch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDroneBody {
    pub drone_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create))
        .route("/all", get(list_all))
        .route("/myorders/{user_id}", get(list_for_user))
        .route("/{id}", get(get_one).put(update_details).delete(remove))
        .route("/{id}/pay", put(pay))
        .route("/{id}/status", put(set_status))
        .route("/{id}/assign-drone", put(assign_drone))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<OrderCreate>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let created = state.orders.create_order(params).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn list_all(
    State(state): State<AppState>,
    Query(filter): Query<BranchFilter>,
) -> Result<Json<Vec<Order>>, AppError> {
    let branch = filter.branch_id.as_deref().filter(|b| !b.is_empty());
    Ok(Json(state.orders.list_all(branch).await?))
}

async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list_for_user(&user_id).await?))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>, AppError> {
    let id: OrderId = id.parse()?;
    Ok(Json(state.orders.get_order(id).await?))
}

async fn update_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<OrderUpdate>,
) -> Result<Json<OrderResponse>, AppError> {
    let id: OrderId = id.parse()?;
    Ok(Json(state.orders.update_details(id, update).await?.into()))
}

async fn pay(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<OrderResponse>, AppError> {
    let id: OrderId = id.parse()?;
    Ok(Json(state.orders.confirm_payment(id).await?.into()))
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<OrderResponse>, AppError> {
    let id: OrderId = id.parse()?;
    let status: OrderStatus = body.status.parse()?;
    Ok(Json(state.orders.set_status(id, status).await?.into()))
}

async fn assign_drone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AssignDroneBody>,
) -> Result<Json<OrderResponse>, AppError> {
    let id: OrderId = id.parse()?;
    Ok(Json(state.orders.assign_drone(id, body.drone_id).await?.into()))
}

async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, AppError> {
    let id: OrderId = id.parse()?;
    let deleted = state.orders.delete_order(id).await?;
    Ok(Json(json!({
        "message": "Order deleted",
        "id": deleted.value,
        "notifications": deleted.notifications,
    })))
}
