//! # FoodFast
//!
//! Order lifecycle services for a drone-delivered food platform.
//!
//! - **[model]**: orders, products, drones and branches as plain serializable data
//! - **[order_actor]**, **[product_actor]**, **[drone_actor]**: the stores, each a
//!   [`ResourceActor`](actor_framework::ResourceActor)
//! - **[clients]**: typed handles over the actors; [`OrderClient`](clients::OrderClient)
//!   also emits the follow-up notifications
//! - **[notify]**: events and the room-based relay that fans them out
//! - **[delivery]**: simulated drone flights with persisted progress
//! - **[remote]**: HTTP stand-ins when a collaborator runs as its own service
//! - **[http]**: the axum gateway
//! - **[lifecycle]**: startup wiring and shutdown
//!
//! ## Order pipeline
//!
//! ```text
//! PENDING_PAYMENT -> PAID_WAITING_PROCESS -> PREPARING -> READY_TO_SHIP
//!     -> DRONE_ASSIGNED -> DELIVERING -> DELIVERED
//! ```
//!
//! Any non-terminal status may also move to `CANCELLED`. See
//! [`TransitionPolicy`](order_actor::TransitionPolicy) for the legacy permissive mode.

pub mod clients;
pub mod config;
pub mod delivery;
pub mod drone_actor;
pub mod geo;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod product_actor;
pub mod remote;
