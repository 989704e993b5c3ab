//! # ActorClient Trait
//!
//! Shared read/delete operations for the domain clients (`OrderClient`, `DroneClient`,
//! ...), each of which wraps a [`ResourceClient`] and maps [`FrameworkError`] into its
//! own error enum.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Default `get`, `list` and `delete` on top of the wrapped [`ResourceClient`].
///
/// ```rust,ignore
/// #[async_trait]
/// impl ActorClient<Drone> for DroneClient {
///     type Error = DroneError;
///     fn inner(&self) -> &ResourceClient<Drone> { &self.inner }
///     fn map_error(e: FrameworkError) -> DroneError { DroneError::from_framework(e) }
/// }
///
/// let fleet = drone_client.list().await?;
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    type Error: Send + Sync;

    fn inner(&self) -> &ResourceClient<T>;

    fn map_error(e: FrameworkError) -> Self::Error;

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
