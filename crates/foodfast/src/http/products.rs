//! `/api/products` handlers. Only what order pricing needs: create, read, reprice.

use crate::http::{AppError, AppState, JsonBody};
use crate::model::{Product, ProductCreate, ProductId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PriceBody {
    pub price: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_one))
        .route("/{id}/price", put(update_price))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.products.create_product(params).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, AppError> {
    let id: ProductId = id.parse()?;
    Ok(Json(state.products.get_product(id).await?))
}

async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PriceBody>,
) -> Result<Json<Product>, AppError> {
    let id: ProductId = id.parse()?;
    Ok(Json(state.products.update_price(id, body.price).await?))
}
