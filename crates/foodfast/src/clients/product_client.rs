//! # Product Client
use crate::model::{Product, ProductCreate, ProductId, ProductRef, ProductSnapshot, ProductUpdate};
use crate::product_actor::ProductError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Where orders read product names and prices from.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `Ok(None)` when the product does not exist or the reference is not one this
    /// catalog understands.
    async fn lookup(&self, product: &ProductRef) -> Result<Option<ProductSnapshot>, ProductError>;
}

#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        debug!("Sending request");
        let id = self
            .inner
            .create(params)
            .await
            .map_err(ProductError::from_framework)?;
        self.get_product(id).await
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ProductError> {
        self.get(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))
    }

    /// Changes the catalog price. Orders already placed keep the price they were
    /// created with.
    #[instrument(skip(self))]
    pub async fn update_price(&self, id: ProductId, price: u64) -> Result<Product, ProductError> {
        let update = ProductUpdate {
            price: Some(price),
            ..ProductUpdate::default()
        };
        self.inner
            .update(id, update)
            .await
            .map_err(ProductError::from_framework)
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ProductError::from_framework(e)
    }
}

#[async_trait]
impl ProductCatalog for ProductClient {
    async fn lookup(&self, product: &ProductRef) -> Result<Option<ProductSnapshot>, ProductError> {
        let Some(id) = product.local_id() else {
            debug!(%product, "Not a local product id");
            return Ok(None);
        };
        Ok(self.get(id).await?.as_ref().map(ProductSnapshot::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::mock::MockClient;

    #[tokio::test]
    async fn lookup_snapshots_the_catalog_entry() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_get(ProductId(1)).return_ok(Some(Product {
            id: ProductId(1),
            name: "Pho bo".into(),
            price: 60_000,
            image: Some("/img/pho.jpg".into()),
        }));
        mock.expect_get(ProductId(2)).return_ok(None);

        let catalog = ProductClient::new(mock.client());
        let pho = catalog.lookup(&ProductRef::new("1")).await.unwrap().unwrap();
        assert_eq!(pho.name, "Pho bo");
        assert_eq!(pho.price, 60_000);
        assert_eq!(pho.product, ProductRef::new("product_1"));
        assert_eq!(catalog.lookup(&ProductId(2).into()).await.unwrap(), None);
        // foreign ids never reach the actor
        assert_eq!(catalog.lookup(&ProductRef::new("64f1a2b3c4d5e6f7a8b9c0d1")).await.unwrap(), None);

        mock.verify();
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let mut mock = MockClient::<Product>::new();
        mock.expect_get(ProductId(5)).return_ok(None);

        let result = ProductClient::new(mock.client()).get_product(ProductId(5)).await;
        assert_eq!(result, Err(ProductError::NotFound("product_5".into())));
    }
}
