use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use system::{ClientId, Outbox, RelayError, RelayMessage};
use tokio::sync::mpsc::error::TrySendError;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

pub struct ConnectionTxStorage {
    connection_txs: HashMap<ClientId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn send(&mut self, to: &ClientId, event: ConnectionEvent) -> Result<(), RelayError> {
        let tx = self
            .connection_txs
            .get(to)
            .ok_or(RelayError::TransportUnavailable(*to))?;
        match tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                log::warn!("Connection {} is not keeping up", to);
                Err(RelayError::TransportUnavailable(*to))
            }
            Err(TrySendError::Closed(_)) => Err(RelayError::TransportUnavailable(*to)),
        }
    }
}

impl Outbox for ConnectionTxStorage {
    type Endpoint = ConnectionTx;

    /// Tells the connection its id before anything else reaches it.
    fn bind(&mut self, client_id: ClientId, tx: ConnectionTx) {
        self.connection_txs.insert(client_id, tx);
        if let Err(e) = self.send(&client_id, ConnectionEvent::Attached { client_id }) {
            log::warn!("Could not confirm attach: {}", e);
        }
    }

    fn unbind(&mut self, client_id: &ClientId) -> Option<ConnectionTx> {
        self.connection_txs.remove(client_id)
    }

    fn deliver(&mut self, to: &ClientId, message: &RelayMessage) -> Result<(), RelayError> {
        self.send(to, ConnectionEvent::Message(message.clone()))
    }
}
