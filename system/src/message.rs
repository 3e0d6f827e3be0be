//! Wire envelope shared by the relay and the rendering client.
//!
//! Each frame is a JSON object `{ "event": <name>, "data": <payload> }`.

use crate::{CodePayload, CursorPayload, PinPayload, RelayError};
use serde::{Deserialize, Serialize};

/// Client → relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    SendCode(CodePayload),
    SendPin(PinPayload),
    SendCursor(CursorPayload),
}

/// Relay → client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum RelayMessage {
    ReceiveCode(CodePayload),
    ReceivePin(PinPayload),
    ReceiveCursor(CursorPayload),
    UserCount(usize),
}

impl ClientMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SendCode(_) => "send_code",
            Self::SendPin(_) => "send_pin",
            Self::SendCursor(_) => "send_cursor",
        }
    }
}

impl RelayMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::ReceiveCode(_) => "receive_code",
            Self::ReceivePin(_) => "receive_pin",
            Self::ReceiveCursor(_) => "receive_cursor",
            Self::UserCount(_) => "user_count",
        }
    }
}

pub fn decode(text: &str) -> Result<ClientMessage, RelayError> {
    serde_json::from_str(text).map_err(|e| RelayError::MalformedEvent(e.to_string()))
}

pub fn encode(message: &RelayMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}
