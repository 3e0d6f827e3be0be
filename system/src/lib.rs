mod error;
pub mod message;
pub mod outbox;
pub mod presence;
pub mod registry;
pub mod relay;
mod room;
mod types;

pub use error::*;
pub use message::{ClientMessage, RelayMessage};
pub use outbox::Outbox;
pub use registry::ConnectionRegistry;
pub use room::*;
pub use types::*;

pub extern crate serde;
pub extern crate serde_json;
pub extern crate uuid;
