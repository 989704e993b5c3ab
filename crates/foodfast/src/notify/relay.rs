//! # Notification Relay
//!
//! A single task owns every live connection and its room memberships. Connections,
//! room joins and emits are all requests on one channel, so a join sent before an emit
//! is always seen by it.
//!
//! Each connection has a bounded buffer. When a slow client's buffer is full the event is
//! dropped for that client only; when a client has gone away it is forgotten.

use crate::notify::{EmitReceipt, Event, Notifier, NotifyError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

pub type ConnectionId = u64;

/// What a subscriber receives: the event name and its data, without routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    pub data: Value,
}

enum RelayRequest {
    Connect {
        respond_to: oneshot::Sender<(ConnectionId, mpsc::Receiver<Envelope>)>,
    },
    Join {
        connection: ConnectionId,
        room: String,
    },
    Leave {
        connection: ConnectionId,
        room: String,
    },
    Disconnect {
        connection: ConnectionId,
    },
    Emit {
        event: Event,
        respond_to: oneshot::Sender<usize>,
    },
    Shutdown,
}

struct Connection {
    sender: mpsc::Sender<Envelope>,
    rooms: HashSet<String>,
}

pub struct NotificationRelay {
    receiver: mpsc::Receiver<RelayRequest>,
    connections: HashMap<ConnectionId, Connection>,
    next_id: ConnectionId,
    client_buffer: usize,
}

impl NotificationRelay {
    /// `client_buffer` bounds how many undelivered events one connection may queue.
    pub fn new(buffer_size: usize, client_buffer: usize) -> (Self, RelayClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let relay = Self {
            receiver,
            connections: HashMap::new(),
            next_id: 1,
            client_buffer: client_buffer.max(1),
        };
        (relay, RelayClient { sender })
    }

    /// Runs until every [`RelayClient`] and [`Subscription`] is gone or a shutdown is
    /// requested.
    pub async fn run(mut self) {
        info!("Relay started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                RelayRequest::Connect { respond_to } => {
                    let id = self.next_id;
                    self.next_id += 1;
                    let (sender, receiver) = mpsc::channel(self.client_buffer);
                    self.connections.insert(
                        id,
                        Connection {
                            sender,
                            rooms: HashSet::new(),
                        },
                    );
                    debug!(connection = id, total = self.connections.len(), "Connected");
                    let _ = respond_to.send((id, receiver));
                }
                RelayRequest::Join { connection, room } => {
                    if let Some(conn) = self.connections.get_mut(&connection) {
                        debug!(connection, %room, "Joined room");
                        conn.rooms.insert(room);
                    }
                }
                RelayRequest::Leave { connection, room } => {
                    if let Some(conn) = self.connections.get_mut(&connection) {
                        debug!(connection, %room, "Left room");
                        conn.rooms.remove(&room);
                    }
                }
                RelayRequest::Disconnect { connection } => {
                    if self.connections.remove(&connection).is_some() {
                        debug!(connection, total = self.connections.len(), "Disconnected");
                    }
                }
                RelayRequest::Emit { event, respond_to } => {
                    let recipients = self.fan_out(event);
                    let _ = respond_to.send(recipients);
                }
                RelayRequest::Shutdown => break,
            }
        }

        info!(connections = self.connections.len(), "Relay shutdown");
    }

    fn fan_out(&mut self, event: Event) -> usize {
        let envelope = Envelope {
            event: event.event,
            data: event.data,
        };
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, conn) in &self.connections {
            if let Some(room) = &event.room {
                if !conn.rooms.contains(room) {
                    continue;
                }
            }
            match conn.sender.try_send(envelope.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(connection = id, event = %envelope.event, "Subscriber buffer full, event dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }
        for id in closed {
            self.connections.remove(&id);
            debug!(connection = id, "Dropped closed connection");
        }

        info!(event = %envelope.event, room = ?event.room, recipients = delivered, "Relay emit");
        delivered
    }
}

/// Handle to the relay. Cheap to clone.
#[derive(Clone)]
pub struct RelayClient {
    sender: mpsc::Sender<RelayRequest>,
}

impl RelayClient {
    pub async fn connect(&self) -> Result<Subscription, NotifyError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RelayRequest::Connect { respond_to })
            .await
            .map_err(|_| NotifyError::RelayClosed)?;
        let (id, receiver) = response.await.map_err(|_| NotifyError::RelayClosed)?;
        Ok(Subscription {
            id,
            receiver,
            relay: self.sender.clone(),
        })
    }

    /// Number of connections the event was handed to. Zero is a success.
    #[instrument(skip(self, event), fields(event = %event.event, room = ?event.room))]
    pub async fn publish(&self, event: Event) -> Result<usize, NotifyError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RelayRequest::Emit { event, respond_to })
            .await
            .map_err(|_| NotifyError::RelayClosed)?;
        response.await.map_err(|_| NotifyError::RelayClosed)
    }

    /// Stops the relay even while subscriptions are still open.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(RelayRequest::Shutdown).await;
    }
}

#[async_trait]
impl Notifier for RelayClient {
    async fn emit(&self, event: Event) -> Result<EmitReceipt, NotifyError> {
        let recipients = self.publish(event).await?;
        Ok(EmitReceipt {
            recipients: Some(recipients),
        })
    }
}

/// One subscriber connection. Dropping it disconnects.
pub struct Subscription {
    id: ConnectionId,
    receiver: mpsc::Receiver<Envelope>,
    relay: mpsc::Sender<RelayRequest>,
}

impl Subscription {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub async fn join(&self, room: impl Into<String>) -> Result<(), NotifyError> {
        self.relay
            .send(RelayRequest::Join {
                connection: self.id,
                room: room.into(),
            })
            .await
            .map_err(|_| NotifyError::RelayClosed)
    }

    pub async fn leave(&self, room: impl Into<String>) -> Result<(), NotifyError> {
        self.relay
            .send(RelayRequest::Leave {
                connection: self.id,
                room: room.into(),
            })
            .await
            .map_err(|_| NotifyError::RelayClosed)
    }

    /// Next event, or `None` once the relay has forgotten this connection.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // A full request queue leaves the entry behind; the next emit finds it closed.
        let _ = self
            .relay
            .try_send(RelayRequest::Disconnect { connection: self.id });
    }
}
