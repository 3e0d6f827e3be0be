use crate::{ClientId, RelayError, RelayMessage};

/// Per-client outbound transport as seen by the room.
///
/// `deliver` must not wait for the peer; a send that cannot be handed off immediately is
/// reported as `TransportUnavailable` and the caller moves on.
pub trait Outbox {
    type Endpoint;

    fn bind(&mut self, client_id: ClientId, endpoint: Self::Endpoint);
    fn unbind(&mut self, client_id: &ClientId) -> Option<Self::Endpoint>;
    fn deliver(&mut self, to: &ClientId, message: &RelayMessage) -> Result<(), RelayError>;
}

/// An in-process outbox that keeps every delivered message per client.
///
/// Endpoints are the receiving inboxes themselves. Useful for embedding the room without a
/// network transport and for exercising it in tests.
#[derive(Default)]
pub struct MemoryOutbox {
    inboxes: std::collections::HashMap<ClientId, Vec<RelayMessage>>,
    severed: std::collections::HashSet<ClientId>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far by `client_id`, oldest first.
    pub fn received(&self, client_id: &ClientId) -> &[RelayMessage] {
        self.inboxes
            .get(client_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Takes the messages received so far by `client_id`, leaving its inbox empty.
    pub fn drain(&mut self, client_id: &ClientId) -> Vec<RelayMessage> {
        self.inboxes
            .get_mut(client_id)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Makes every later delivery to `client_id` fail as if its socket had broken.
    pub fn sever(&mut self, client_id: &ClientId) {
        self.severed.insert(*client_id);
    }
}

impl Outbox for MemoryOutbox {
    type Endpoint = Vec<RelayMessage>;

    fn bind(&mut self, client_id: ClientId, endpoint: Self::Endpoint) {
        self.inboxes.insert(client_id, endpoint);
    }

    fn unbind(&mut self, client_id: &ClientId) -> Option<Self::Endpoint> {
        self.severed.remove(client_id);
        self.inboxes.remove(client_id)
    }

    fn deliver(&mut self, to: &ClientId, message: &RelayMessage) -> Result<(), RelayError> {
        if self.severed.contains(to) {
            return Err(RelayError::TransportUnavailable(*to));
        }
        match self.inboxes.get_mut(to) {
            Some(inbox) => {
                inbox.push(message.clone());
                Ok(())
            }
            None => Err(RelayError::TransportUnavailable(*to)),
        }
    }
}
