use crate::ClientId;
use thiserror::Error;

/// Nothing here is fatal to the relay process. Each variant has a local recovery:
/// reject the attach, drop the event, or skip the peer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("room is full ({limit} clients)")]
    CapacityExceeded { limit: usize },

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("client {0} is unreachable")]
    TransportUnavailable(ClientId),
}
