//! # Product Actor
//!
//! The in-process product store. Orders read it once, at creation, through the
//! [`ProductCatalog`](crate::clients::ProductCatalog) seam; repricing a product afterwards
//! leaves existing orders untouched.

pub mod entity;
pub mod error;

pub use error::*;

use crate::model::Product;
use actor_framework::{ResourceActor, ResourceClient};

/// Creates a new Product actor and its client.
pub fn new() -> (ResourceActor<Product>, ResourceClient<Product>) {
    ResourceActor::new(32)
}
