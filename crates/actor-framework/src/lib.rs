//! # Actor Framework
//!
//! Resource actors for the FoodFast services. Every store in the platform (orders,
//! products, drones) is a [`ResourceActor`] that owns its records and processes
//! requests one at a time, so a single order is never mutated by two requests at once.
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]) - the record type plus its lifecycle hooks
//! 2. **Runtime** ([`ResourceActor`]) - the message loop that owns the store
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]) - cloneable async handles
//!
//! The entity decides *what* happens on create/update/action; the actor decides *when*.
//!
//! ## Example
//!
//! ```rust
//! use actor_framework::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Dish { id: u32, price: u64 }
//! #[derive(Debug)] struct DishCreate { price: u64 }
//! #[derive(Debug)] struct DishUpdate { price: Option<u64> }
//! #[derive(Debug)] enum DishAction {}
//! #[derive(Debug, thiserror::Error)] #[error("dish error")] struct DishError;
//!
//! #[async_trait]
//! impl ActorEntity for Dish {
//!     type Id = u32;
//!     type Create = DishCreate;
//!     type Update = DishUpdate;
//!     type Action = DishAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = DishError;
//!
//!     fn from_create_params(id: u32, params: DishCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, price: params.price })
//!     }
//!
//!     async fn on_update(&mut self, update: DishUpdate, _: &()) -> Result<(), Self::Error> {
//!         if let Some(price) = update.price { self.price = price; }
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, _: DishAction, _: &()) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Dish>::new(8);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(DishCreate { price: 45_000 }).await.unwrap();
//!     let dish = client.get(id).await.unwrap().unwrap();
//!     assert_eq!(dish.price, 45_000);
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies are handed to [`ResourceActor::run`], not to the constructor. The order
//! actor receives its product catalog and pricing rules this way, after every other
//! actor has been created, which keeps construction free of ordering constraints.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from a queue of expectations, and
//! [`mock::create_mock_client`] hands the raw request channel to the test.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
