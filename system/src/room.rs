use crate::{presence, relay, ClientId, ClientMessage, ConnectionRegistry, Outbox, RelayError};

/// The single implicit room.
///
/// Owns the registry; membership only changes through `attach`/`detach`, each of which
/// announces the new count before returning.
pub struct Room {
    registry: ConnectionRegistry,
}

impl Room {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            registry: ConnectionRegistry::new(capacity),
        }
    }

    pub fn attach<O: Outbox>(
        &mut self,
        outbox: &mut O,
        endpoint: O::Endpoint,
    ) -> Result<ClientId, RelayError> {
        let client_id = self.registry.attach()?;
        outbox.bind(client_id, endpoint);
        log::info!(
            "Client {} attached (total: {})",
            client_id,
            self.registry.count()
        );
        presence::announce(self.registry.members(), self.registry.count(), outbox);
        Ok(client_id)
    }

    /// Returns `false` if `client_id` was not attached, in which case nothing is announced.
    pub fn detach<O: Outbox>(&mut self, outbox: &mut O, client_id: &ClientId) -> bool {
        outbox.unbind(client_id);
        if !self.registry.detach(client_id) {
            log::debug!("Ignored detach of unknown client {}", client_id);
            return false;
        }
        log::info!(
            "Client {} detached (total: {})",
            client_id,
            self.registry.count()
        );
        presence::announce(self.registry.members(), self.registry.count(), outbox);
        true
    }

    pub fn relay<O: Outbox>(
        &self,
        outbox: &mut O,
        sender: &ClientId,
        message: ClientMessage,
    ) -> usize {
        relay::relay(sender, self.registry.members(), message, outbox)
    }

    pub fn count(&self) -> usize {
        self.registry.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbox::MemoryOutbox;
    use crate::{CodePayload, RelayMessage};

    #[test]
    fn it_announces_to_the_attaching_client_too() {
        let mut room = Room::new(None);
        let mut outbox = MemoryOutbox::new();

        let a = room.attach(&mut outbox, Vec::new()).expect("");
        assert_eq!(outbox.drain(&a), vec![RelayMessage::UserCount(1)]);

        let b = room.attach(&mut outbox, Vec::new()).expect("");
        assert_eq!(outbox.drain(&a), vec![RelayMessage::UserCount(2)]);
        assert_eq!(outbox.drain(&b), vec![RelayMessage::UserCount(2)]);
    }

    #[test]
    fn it_announces_once_per_effective_detach() {
        let mut room = Room::new(None);
        let mut outbox = MemoryOutbox::new();
        let a = room.attach(&mut outbox, Vec::new()).expect("");
        let b = room.attach(&mut outbox, Vec::new()).expect("");
        outbox.drain(&a);

        assert!(room.detach(&mut outbox, &b));
        assert!(!room.detach(&mut outbox, &b));
        assert_eq!(outbox.drain(&a), vec![RelayMessage::UserCount(1)]);
        assert_eq!(room.count(), 1);
    }

    #[test]
    fn it_binds_nothing_when_full() {
        let mut room = Room::new(Some(1));
        let mut outbox = MemoryOutbox::new();
        let a = room.attach(&mut outbox, Vec::new()).expect("");
        outbox.drain(&a);

        assert_eq!(
            room.attach(&mut outbox, Vec::new()),
            Err(RelayError::CapacityExceeded { limit: 1 })
        );
        assert!(outbox.received(&a).is_empty());
        assert_eq!(room.count(), 1);
    }

    #[test]
    fn detached_clients_stop_receiving() {
        let mut room = Room::new(None);
        let mut outbox = MemoryOutbox::new();
        let a = room.attach(&mut outbox, Vec::new()).expect("");
        let b = room.attach(&mut outbox, Vec::new()).expect("");
        room.detach(&mut outbox, &b);

        let delivered = room.relay(
            &mut outbox,
            &a,
            ClientMessage::SendCode(CodePayload::new("late")),
        );
        assert_eq!(delivered, 0);
        assert!(outbox.received(&b).is_empty());
    }
}
