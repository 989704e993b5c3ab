//! # Clients
//!
//! Typed wrappers over the generic [`ResourceClient`](actor_framework::ResourceClient)s.
//! They translate framework errors into each actor's own error enum, and the order
//! client also sends the notifications that follow every order mutation.
//!
//! Two traits mark where a remote service can stand in for an in-process actor:
//! [`ProductCatalog`] (pricing at order creation) and [`OrderStatusCallback`] (the
//! delivery loop writing back to orders).

pub mod drone_client;
pub mod order_client;
pub mod product_client;

pub use drone_client::*;
pub use order_client::*;
pub use product_client::*;
