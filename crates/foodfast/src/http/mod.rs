//! # Gateway
//!
//! The axum surface over the in-process services:
//!
//! - `/api/orders`: order lifecycle ([`orders`])
//! - `/api/products`: the product store orders are priced from ([`products`])
//! - `/api/delivery`: fleet and flights ([`delivery`])
//! - `/socket/emit` and `/socket`: the notification relay ([`socket`])
//!
//! Errors leave as `{"message": ...}` with the status chosen by [`AppError`].

pub mod delivery;
pub mod error;
pub mod extract;
pub mod orders;
pub mod products;
pub mod socket;

pub use error::AppError;
pub use extract::JsonBody;

use crate::clients::{OrderClient, ProductClient};
use crate::delivery::DeliveryService;
use crate::notify::RelayClient;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::signal::{self, ctrl_c};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderClient,
    pub products: ProductClient,
    pub delivery: DeliveryService,
    pub relay: RelayClient,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/socket/emit", post(socket::emit))
        .route("/socket", get(socket::upgrade))
        .nest("/api/orders", orders::routes())
        .nest("/api/products", products::routes())
        .nest("/api/delivery", delivery::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
