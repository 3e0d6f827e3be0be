use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifies one attached client for the lifetime of its connection.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(uuid::Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Full buffer content. Receivers replace their text with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodePayload {
    pub code: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A positional annotation. `x`/`y` are relative to the sender's own viewport.
///
/// The optional `author` travels in `extra` exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinPayload {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A live pointer position. `id` keys the cursor on the receiving side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorPayload {
    pub x: f64,
    pub y: f64,
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CodePayload {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            extra: Map::new(),
        }
    }
}

impl PinPayload {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            extra: Map::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.extra
            .insert("author".into(), Value::String(author.into()));
        self
    }

    pub fn author(&self) -> Option<&str> {
        self.extra.get("author").and_then(Value::as_str)
    }
}

impl CursorPayload {
    pub fn new(x: f64, y: f64, id: impl Into<String>) -> Self {
        Self {
            x,
            y,
            id: id.into(),
            extra: Map::new(),
        }
    }
}
