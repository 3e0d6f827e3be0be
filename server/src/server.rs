use tokio::sync::mpsc::{channel, Sender};
use tokio::sync::oneshot;

use system::{ClientId, ClientMessage, RelayError, Room};

use crate::config::Config;
use crate::connection::ConnectionEvent;
use crate::connection_tx_storage::{ConnectionTx, ConnectionTxStorage};

const SERVER_BUFFER: usize = 256;

pub type ServerTx = Sender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connect {
        tx: ConnectionTx,
    },
    Disconnect {
        from: ClientId,
    },
    Event {
        from: ClientId,
        message: ClientMessage,
    },
    GetPresence {
        tx: oneshot::Sender<usize>,
    },
}

/// Owns all shared state. Commands are handled one at a time on a single task.
struct Server {
    room: Room,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new(max_clients: Option<usize>) -> Self {
        Self {
            room: Room::new(max_clients),
            connections: ConnectionTxStorage::new(),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connect { tx } => {
                if let Err(e) = self.room.attach(&mut self.connections, tx.clone()) {
                    log::warn!("Rejected connection: {}", e);
                    let reason = match e {
                        RelayError::CapacityExceeded { .. } => "capacity exceeded".to_string(),
                        e => e.to_string(),
                    };
                    let _ = tx.try_send(ConnectionEvent::Rejected { reason });
                }
            }
            ServerCommand::Disconnect { from } => {
                self.room.detach(&mut self.connections, &from);
            }
            ServerCommand::Event { from, message } => {
                let event_name = message.event_name();
                let delivered = self.room.relay(&mut self.connections, &from, message);
                log::debug!("Relayed {} from {} to {} peers", event_name, from, delivered);
            }
            ServerCommand::GetPresence { tx } => {
                let _ = tx.send(self.room.count());
            }
        }
    }
}

pub fn spawn_server(config: &Config) -> ServerTx {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(SERVER_BUFFER);
    let max_clients = config.max_clients;

    tokio::spawn(async move {
        let mut server = Server::new(max_clients);

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
        log::info!("Relay dispatch stopped");
    });

    srv_tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use system::{CodePayload, CursorPayload, RelayMessage};
    use tokio::sync::mpsc::Receiver;

    async fn presence(srv_tx: &ServerTx) -> usize {
        let (tx, rx) = oneshot::channel();
        srv_tx
            .send(ServerCommand::GetPresence { tx })
            .await
            .expect("");
        rx.await.expect("")
    }

    async fn connect(srv_tx: &ServerTx) -> (ClientId, Receiver<ConnectionEvent>) {
        let (tx, mut rx) = channel(16);
        srv_tx.send(ServerCommand::Connect { tx }).await.expect("");
        match rx.recv().await {
            Some(ConnectionEvent::Attached { client_id }) => (client_id, rx),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn pending(rx: &mut Receiver<ConnectionEvent>) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn counts(events: &[ConnectionEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                ConnectionEvent::Message(RelayMessage::UserCount(n)) => Some(*n),
                _ => None,
            })
            .collect()
    }

    #[actix_web::test]
    async fn it_relays_code_to_everyone_but_the_sender() {
        let srv_tx = spawn_server(&Config::default());
        let (_c1, mut rx1) = connect(&srv_tx).await;
        let (c2, mut rx2) = connect(&srv_tx).await;
        let (_c3, mut rx3) = connect(&srv_tx).await;
        assert_eq!(presence(&srv_tx).await, 3);

        assert_eq!(counts(&pending(&mut rx1)), vec![1, 2, 3]);
        assert_eq!(counts(&pending(&mut rx2)), vec![2, 3]);
        assert_eq!(counts(&pending(&mut rx3)), vec![3]);

        srv_tx
            .send(ServerCommand::Event {
                from: c2,
                message: ClientMessage::SendCode(CodePayload::new("x")),
            })
            .await
            .expect("");
        presence(&srv_tx).await;

        let expected = vec![ConnectionEvent::Message(RelayMessage::ReceiveCode(
            CodePayload::new("x"),
        ))];
        assert_eq!(pending(&mut rx1), expected);
        assert_eq!(pending(&mut rx3), expected);
        assert!(pending(&mut rx2).is_empty());
    }

    #[actix_web::test]
    async fn it_announces_detach_to_remaining_clients() {
        let srv_tx = spawn_server(&Config::default());
        let (_c1, mut rx1) = connect(&srv_tx).await;
        let (c2, mut rx2) = connect(&srv_tx).await;
        presence(&srv_tx).await;
        pending(&mut rx1);

        srv_tx
            .send(ServerCommand::Disconnect { from: c2 })
            .await
            .expect("");
        srv_tx
            .send(ServerCommand::Disconnect { from: c2 })
            .await
            .expect("");
        assert_eq!(presence(&srv_tx).await, 1);

        assert_eq!(counts(&pending(&mut rx1)), vec![1]);
        // Unbinding drops the server's sender, closing the connection's channel.
        assert_eq!(counts(&pending(&mut rx2)), vec![2]);
        assert!(rx2.recv().await.is_none());
    }

    #[actix_web::test]
    async fn it_rejects_connections_beyond_capacity() {
        let srv_tx = spawn_server(&Config {
            max_clients: Some(1),
            ..Config::default()
        });
        let (_c1, mut rx1) = connect(&srv_tx).await;
        presence(&srv_tx).await;
        pending(&mut rx1);

        let (tx, mut rx) = channel(4);
        srv_tx.send(ServerCommand::Connect { tx }).await.expect("");
        assert_eq!(
            rx.recv().await,
            Some(ConnectionEvent::Rejected {
                reason: "capacity exceeded".into()
            })
        );
        assert_eq!(presence(&srv_tx).await, 1);
        assert!(pending(&mut rx1).is_empty());
    }

    #[actix_web::test]
    async fn it_skips_a_peer_whose_socket_is_gone() {
        let srv_tx = spawn_server(&Config::default());
        let (c1, _rx1) = connect(&srv_tx).await;
        let (_c2, rx2) = connect(&srv_tx).await;
        let (_c3, mut rx3) = connect(&srv_tx).await;
        presence(&srv_tx).await;
        drop(rx2);
        pending(&mut rx3);

        srv_tx
            .send(ServerCommand::Event {
                from: c1,
                message: ClientMessage::SendCursor(CursorPayload::new(1.0, 2.0, "ignored")),
            })
            .await
            .expect("");
        presence(&srv_tx).await;

        assert_eq!(
            pending(&mut rx3),
            vec![ConnectionEvent::Message(RelayMessage::ReceiveCursor(
                CursorPayload::new(1.0, 2.0, c1.to_string())
            ))]
        );
    }
}
