//! # Remote Services
//!
//! HTTP stand-ins for the in-process actors, used when the product store, the order
//! service or the relay run elsewhere. All of them share one `reqwest::Client` whose
//! timeout bounds every call; nothing is retried.

use crate::clients::{OrderProgress, OrderStatusCallback, ProductCatalog};
use crate::model::{OrderId, OrderStatus, ProductRef, ProductSnapshot};
use crate::notify::{EmitReceipt, Event, Notifier, NotifyError};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

fn trim(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// Posts events to a relay's `/socket/emit`.
#[derive(Clone)]
pub struct HttpNotifier {
    client: Client,
    emit_url: String,
}

impl HttpNotifier {
    pub fn new(client: Client, relay_base: &str) -> Self {
        Self {
            client,
            emit_url: format!("{}/socket/emit", trim(relay_base)),
        }
    }
}

#[derive(Deserialize)]
struct EmitResponse {
    success: bool,
    #[serde(default)]
    recipients: Option<usize>,
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip(self, event), fields(event = %event.event))]
    async fn emit(&self, event: Event) -> Result<EmitReceipt, NotifyError> {
        let response = self
            .client
            .post(&self.emit_url)
            .json(&event)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        let body: EmitResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        if !body.success {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(EmitReceipt {
            recipients: body.recipients,
        })
    }
}

/// Reads products from `GET {base}/{reference}`. The reference is sent as written on the
/// order line, so a catalog with its own id scheme can price it.
#[derive(Clone)]
pub struct HttpProductCatalog {
    client: Client,
    base: String,
}

impl HttpProductCatalog {
    pub fn new(client: Client, base: &str) -> Self {
        Self {
            client,
            base: trim(base),
        }
    }
}

#[derive(Deserialize)]
struct RemoteProduct {
    name: String,
    price: u64,
    #[serde(default, alias = "imageUrl")]
    image: Option<String>,
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn lookup(&self, product: &ProductRef) -> Result<Option<ProductSnapshot>, ProductError> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| ProductError::Unavailable(format!("bad product service URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ProductError::Unavailable(format!("{} cannot take a path", self.base)))?
            .push(product.as_str());
        debug!(%url, "Product lookup");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProductError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let remote: RemoteProduct = response
                    .json()
                    .await
                    .map_err(|e| ProductError::Unavailable(e.to_string()))?;
                Ok(Some(ProductSnapshot {
                    product: product.clone(),
                    name: remote.name,
                    price: remote.price,
                    image: remote.image,
                }))
            }
            status => Err(ProductError::Unavailable(format!("{url} answered {status}"))),
        }
    }
}

/// Writes back to `PUT {base}/{id}/assign-drone` and `PUT {base}/{id}/status`, and reads
/// `GET {base}/{id}` before a flight is resumed.
#[derive(Clone)]
pub struct HttpOrderStatus {
    client: Client,
    base: String,
}

impl HttpOrderStatus {
    pub fn new(client: Client, base: &str) -> Self {
        Self {
            client,
            base: trim(base),
        }
    }

    async fn put(&self, id: OrderId, path: &str, body: serde_json::Value) -> Result<(), OrderError> {
        let url = format!("{}/{}/{}", self.base, id, path);
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrderError::Remote(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(OrderError::NotFound(id.to_string())),
            status if status.is_success() => Ok(()),
            status => Err(OrderError::Remote(format!("{url} answered {status}"))),
        }
    }
}

#[async_trait]
impl OrderStatusCallback for HttpOrderStatus {
    async fn attach_drone(&self, id: OrderId, drone: String) -> Result<(), OrderError> {
        self.put(id, "assign-drone", json!({ "droneId": drone })).await
    }

    async fn write_status(&self, id: OrderId, status: OrderStatus) -> Result<(), OrderError> {
        self.put(id, "status", json!({ "status": status })).await
    }

    async fn progress(&self, id: OrderId) -> Result<Option<OrderProgress>, OrderError> {
        let url = format!("{}/{}", self.base, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OrderError::Remote(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| OrderError::Remote(e.to_string())),
            status => Err(OrderError::Remote(format!("{url} answered {status}"))),
        }
    }
}
