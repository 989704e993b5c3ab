//! # Mock Clients
//!
//! Test doubles for a [`ResourceClient`]. They let the order actor be exercised against
//! a product store that answers on cue, and let client wrappers be checked without a
//! running actor.
//!
//! | | `MockClient` | `create_mock_client` | real actor |
//! |---|---|---|---|
//! | Replies | queued expectations | the test answers by hand | real state |
//! | Failure injection | `return_err` | send any `Err` | hard |
//! | Inspects payloads | no | yes | no |
//!
//! ## Queued expectations
//!
//! ```rust,ignore
//! let mut products = MockClient::<Product>::new();
//! products.expect_get(ProductId(1)).return_ok(Some(pho));
//! products.expect_get(ProductId(2)).return_err(FrameworkError::ActorClosed);
//!
//! let catalog = ProductClient::new(products.client());
//! // the order actor now prices item 1 and drops item 2
//! products.verify();
//! ```
//!
//! ## Hand-answered requests
//!
//! ```rust,ignore
//! let (client, mut requests) = create_mock_client::<Order>(4);
//! let task = tokio::spawn(async move { OrderClient::new(client, notifier).pay(id).await });
//! let (id, action, reply) = expect_action(&mut requests).await.unwrap();
//! assert!(matches!(action, OrderAction::ConfirmPayment { .. }));
//! reply.send(Ok(paid_order)).unwrap();
//! ```

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// One queued reply. Requests are matched strictly in order; the id is kept for
/// diagnostics only.
enum Expectation<T: ActorEntity> {
    Get {
        response: Result<Option<T>, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Update {
        response: Result<T, FrameworkError>,
    },
    Delete {
        response: Result<(), FrameworkError>,
    },
    Action {
        response: Result<T::ActionResult, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn push<T: ActorEntity>(queue: &Queue<T>, expectation: Expectation<T>) {
    queue
        .lock()
        .expect("mock expectation queue poisoned")
        .push_back(expectation);
}

/// A client whose replies come from a queue of expectations.
///
/// An unexpected request panics the background task, which surfaces in the caller as
/// [`FrameworkError::ActorDropped`].
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a mock with an empty queue. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = queue
                    .lock()
                    .expect("mock expectation queue poisoned")
                    .pop_front();

                match (request, next) {
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { respond_to, .. },
                        Some(Expectation::Update { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Delete { respond_to, .. },
                        Some(Expectation::Delete { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { respond_to, .. },
                        Some(Expectation::Action { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    _ => panic!("Unexpected request or expectation mismatch"),
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_get(&mut self, _id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Get { response })
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::List { response })
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Create {
            response,
        })
    }

    pub fn expect_update(&mut self, _id: T::Id) -> ExpectationBuilder<T, T> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Update {
            response,
        })
    }

    pub fn expect_delete(&mut self, _id: T::Id) -> ExpectationBuilder<T, ()> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Delete {
            response,
        })
    }

    pub fn expect_action(&mut self, _id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Action {
            response,
        })
    }

    /// Panics if any queued expectation was never consumed.
    pub fn verify(&self) {
        let remaining = self
            .expectations
            .lock()
            .expect("mock expectation queue poisoned")
            .len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Completes an expectation with either a success or an error reply.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(expectations: &Queue<T>, wrap: fn(Result<R, FrameworkError>) -> Expectation<T>) -> Self {
        Self {
            expectations: expectations.clone(),
            wrap,
        }
    }

    pub fn return_ok(self, value: R) {
        push(&self.expectations, (self.wrap)(Ok(value)));
    }

    pub fn return_err(self, error: FrameworkError) {
        push(&self.expectations, (self.wrap)(Err(error)));
    }
}

/// A client plus the raw request stream, for tests that inspect payloads and reply by hand.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request, if it is a Create.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a Get.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next request, if it is an Action.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Drone {
        id: u32,
        name: String,
        battery: u8,
    }

    #[derive(Debug)]
    struct DroneCreate {
        name: String,
    }

    #[derive(Debug)]
    struct DroneUpdate;

    #[derive(Debug)]
    enum DroneAction {
        Recharge,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("drone error")]
    struct DroneError;

    #[async_trait]
    impl ActorEntity for Drone {
        type Id = u32;
        type Create = DroneCreate;
        type Update = DroneUpdate;
        type Action = DroneAction;
        type ActionResult = u8;
        type Context = ();
        type Error = DroneError;

        fn from_create_params(id: u32, params: DroneCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                name: params.name,
                battery: 100,
            })
        }

        async fn on_update(&mut self, _: DroneUpdate, _: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn handle_action(&mut self, _: DroneAction, _: &()) -> Result<u8, Self::Error> {
            self.battery = 100;
            Ok(self.battery)
        }
    }

    fn alpha() -> Drone {
        Drone {
            id: 1,
            name: "Drone Alpha 01".into(),
            battery: 80,
        }
    }

    #[tokio::test]
    async fn hand_answered_create_returns_the_reply() {
        let (client, mut receiver) = create_mock_client::<Drone>(4);

        let task = tokio::spawn(async move {
            client
                .create(DroneCreate {
                    name: "Drone Beta 02".into(),
                })
                .await
        });

        let (params, reply) = expect_create(&mut receiver).await.expect("create request");
        assert_eq!(params.name, "Drone Beta 02");
        reply.send(Ok(2)).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), 2);
    }

    #[tokio::test]
    async fn queued_expectations_are_served_in_order() {
        let mut mock = MockClient::<Drone>::new();
        mock.expect_get(1).return_ok(Some(alpha()));
        mock.expect_list().return_ok(vec![alpha()]);
        mock.expect_action(1).return_ok(100);
        mock.expect_delete(1).return_err(FrameworkError::NotFound("1".into()));

        let client = mock.client();
        assert_eq!(client.get(1).await.unwrap(), Some(alpha()));
        assert_eq!(client.list().await.unwrap().len(), 1);
        assert_eq!(client.perform_action(1, DroneAction::Recharge).await.unwrap(), 100);
        assert!(matches!(
            client.delete(1).await,
            Err(FrameworkError::NotFound(_))
        ));

        mock.verify();
    }

    #[tokio::test]
    async fn mismatched_request_surfaces_as_dropped_actor() {
        let mut mock = MockClient::<Drone>::new();
        mock.expect_list().return_ok(vec![]);

        let result = mock.client().get(1).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }
}
