//! The relay's network face: `POST /socket/emit` for publishers and the `GET /socket`
//! WebSocket for browsers.

use crate::http::{AppError, AppState, JsonBody};
use crate::notify::{Event, RelayClient, Subscription};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub async fn emit(State(state): State<AppState>, JsonBody(event): JsonBody<Event>) -> Result<Json<Value>, AppError> {
    let recipients = state.relay.publish(event).await?;
    Ok(Json(json!({ "success": true, "recipients": recipients })))
}

pub async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state.relay))
}

/// A room change requested by the browser.
#[derive(Debug, PartialEq, Eq)]
pub enum RoomCommand {
    Join(String),
    Leave(String),
}

#[derive(Deserialize)]
struct ControlFrame {
    join: Option<String>,
    leave: Option<String>,
}

impl RoomCommand {
    /// Accepts `{"join": room}`, `{"leave": room}`, a JSON string, or the bare room id.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(frame) = serde_json::from_str::<ControlFrame>(text) {
            return match (frame.join, frame.leave) {
                (Some(room), _) => Some(Self::Join(room)),
                (None, Some(room)) => Some(Self::Leave(room)),
                (None, None) => None,
            };
        }
        if let Ok(room) = serde_json::from_str::<String>(text) {
            return (!room.is_empty()).then_some(Self::Join(room));
        }
        (!text.is_empty() && !text.starts_with('{')).then(|| Self::Join(text.to_string()))
    }
}

async fn apply(subscription: &Subscription, text: &str) -> bool {
    let result = match RoomCommand::parse(text) {
        Some(RoomCommand::Join(room)) => subscription.join(room).await,
        Some(RoomCommand::Leave(room)) => subscription.leave(room).await,
        None => {
            debug!(connection = subscription.id(), "Ignoring unrecognised frame");
            return true;
        }
    };
    result.is_ok()
}

async fn serve_socket(socket: WebSocket, relay: RelayClient) {
    let mut subscription = match relay.connect().await {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(error = %e, "Relay refused WebSocket connection");
            return;
        }
    };
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            envelope = subscription.recv() => {
                let Some(envelope) = envelope else { break };
                let text = match serde_json::to_string(&envelope) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(event = %envelope.event, error = %e, "Unserialisable event");
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if !apply(&subscription, text.as_str()).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!(connection = subscription.id(), "WebSocket closed");
}
