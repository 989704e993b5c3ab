//! # System Lifecycle
//!
//! [`FoodFastSystem`] starts the actors, wires them together and hands out an
//! [`AppState`] for the gateway.
//!
//! Actors are created first and receive their collaborators at `run` time, so the order
//! actor can hold a product catalog without the product actor knowing about orders.
//! Whether a collaborator is the in-process client or its HTTP stand-in is decided here
//! from [`Config`]:
//!
//! | collaborator | in process | `Config` field for the HTTP stand-in |
//! |--------------|-----------|---------------------------|
//! | notifier | [`RelayClient`] | `relay_url` |
//! | product catalog | [`ProductClient`] | `product_service_url` |
//! | order write-back | [`OrderClient`] | `order_service_url` |
//!
//! ## Startup
//!
//! Order numbering resumes above the highest order id in the delivery store, so no new
//! order shares an id with an old flight. Recovery resumes a flight only if its order
//! still waits for it. With the in-process order store that is never the case after a
//! restart, since orders are not persisted; resuming is for a remote order service that
//! kept its orders.
//!
//! ## Shutdown
//!
//! The relay is stopped with an explicit request because every open subscription holds
//! a sender to it. Flights are halted with their records left `IN_FLIGHT` for the next
//! start's recovery. The resource actors then stop once their last client is dropped.
//! Any [`AppState`] handed to a router must be dropped before calling
//! [`FoodFastSystem::shutdown`], or the actors it references keep running.

use crate::clients::{DroneClient, OrderClient, OrderStatusCallback, ProductCatalog, ProductClient};
use crate::config::Config;
use crate::delivery::{
    DeliveryError, DeliveryService, DeliverySimulator, DeliveryStore, JsonFileStore, RecoveryReport,
};
use crate::drone_actor::{self, DroneError};
use crate::http::AppState;
use crate::notify::{NotificationRelay, Notifier, RelayClient};
use crate::order_actor::{self, OrderContext};
use crate::product_actor;
use crate::remote::{http_client, HttpNotifier, HttpOrderStatus, HttpProductCatalog};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Could not build the HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Could not seed the drone fleet: {0}")]
    Fleet(#[from] DroneError),

    #[error("{0} task failed: {1}")]
    Task(&'static str, tokio::task::JoinError),
}

pub struct FoodFastSystem {
    pub orders: OrderClient,
    pub products: ProductClient,
    pub drones: DroneClient,
    pub relay: RelayClient,
    pub delivery: DeliveryService,
    /// What startup recovery did with flights left from the previous run.
    pub recovery: RecoveryReport,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl FoodFastSystem {
    pub async fn start(config: &Config) -> Result<Self, SystemError> {
        let store = Arc::new(JsonFileStore::open(&config.delivery_store).await?);
        let last_order = store.last_order_id().await?;
        if let Some(last) = last_order {
            info!(%last, "Order numbering continues after delivery history");
        }

        let (product_actor, product_client) = product_actor::new();
        let (drone_actor, drone_client) = drone_actor::new();
        let (order_actor, order_client) = order_actor::numbered_after(last_order);
        let (relay, relay_client) = NotificationRelay::new(256, config.relay_buffer);

        let http = http_client(config.http_timeout)?;
        let products = ProductClient::new(product_client);
        let drones = DroneClient::new(drone_client);

        let notifier: Arc<dyn Notifier> = match &config.relay_url {
            Some(url) => {
                info!(%url, "Publishing notifications to remote relay");
                Arc::new(HttpNotifier::new(http.clone(), url))
            }
            None => Arc::new(relay_client.clone()),
        };
        let catalog: Arc<dyn ProductCatalog> = match &config.product_service_url {
            Some(url) => {
                info!(%url, "Pricing orders from remote product service");
                Arc::new(HttpProductCatalog::new(http.clone(), url))
            }
            None => Arc::new(products.clone()),
        };
        let orders = OrderClient::new(order_client, notifier.clone());
        let callback: Arc<dyn OrderStatusCallback> = match &config.order_service_url {
            Some(url) => {
                info!(%url, "Writing delivery progress to remote order service");
                Arc::new(HttpOrderStatus::new(http, url))
            }
            None => Arc::new(orders.clone()),
        };

        let handles = vec![
            ("product", tokio::spawn(product_actor.run(()))),
            ("drone", tokio::spawn(drone_actor.run(()))),
            (
                "order",
                tokio::spawn(order_actor.run(OrderContext {
                    catalog,
                    pricing: config.pricing,
                    policy: config.transition_policy,
                })),
            ),
            ("relay", tokio::spawn(relay.run())),
        ];

        let simulator = DeliverySimulator::new(config.flight, notifier, callback, drones.clone(), store);
        let delivery = DeliveryService::new(drones.clone(), simulator);

        delivery.seed_fleet().await?;
        let recovery = delivery.simulator().recover(config.recovery_policy).await?;
        info!(
            resumed = recovery.resumed.len(),
            cancelled = recovery.cancelled.len(),
            orphaned = recovery.orphaned.len(),
            policy = ?config.recovery_policy,
            "Delivery recovery finished"
        );

        Ok(Self {
            orders,
            products,
            drones,
            relay: relay_client,
            delivery,
            recovery,
            handles,
        })
    }

    pub fn state(&self) -> AppState {
        AppState {
            orders: self.orders.clone(),
            products: self.products.clone(),
            delivery: self.delivery.clone(),
            relay: self.relay.clone(),
        }
    }

    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        self.delivery.simulator().halt().await;
        self.relay.shutdown().await;
        drop(self.delivery);
        drop(self.orders);
        drop(self.products);
        drop(self.drones);
        drop(self.relay);

        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "Task failed during shutdown");
                return Err(SystemError::Task(name, e));
            }
        }

        info!("System shutdown complete");
        Ok(())
    }
}
