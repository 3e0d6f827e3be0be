use std::time::{Duration, Instant};

use actix::{
    Actor, ActorContext, AsyncContext, Handler, Message, Recipient, Running, StreamHandler,
    WrapFuture,
};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use actix_web_actors::ws::{CloseCode, CloseReason};

use system::message::{decode, encode};
use system::{ClientId, RelayMessage};

use crate::config::Config;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Attached { client_id: ClientId },
    Message(RelayMessage),
    Rejected { reason: String },
}

#[derive(Message)]
#[rtype(result = "()")]
struct ConnectionActorMessage(ConnectionEvent);

#[derive(Debug, PartialEq)]
enum ConnectionState {
    Idle,
    Attached(ClientId),
    Detached,
}

impl ConnectionState {
    /// The command an inbound text frame turns into, if any.
    fn route_ingress(&self, text: &str) -> Option<ServerCommand> {
        let from = match self {
            ConnectionState::Attached(client_id) => *client_id,
            _ => {
                log::debug!("Dropped frame received while not attached");
                return None;
            }
        };
        match decode(text) {
            Ok(message) => {
                log::debug!("Ingress {:?}", message);
                Some(ServerCommand::Event { from, message })
            }
            Err(e) => {
                log::warn!("Dropped event from {}: {}", from, e);
                None
            }
        }
    }

    /// Applies an attach confirmation. A connection that stopped before it landed hands
    /// back the detach it still owes.
    fn confirm_attach(&mut self, client_id: ClientId) -> Option<ServerCommand> {
        match self {
            ConnectionState::Idle => {
                *self = ConnectionState::Attached(client_id);
                None
            }
            ConnectionState::Detached => Some(ServerCommand::Disconnect { from: client_id }),
            ConnectionState::Attached(_) => None,
        }
    }
}

struct ConnectionActor {
    state: ConnectionState,
    srv_tx: ServerTx,
    buffer: usize,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    last_heartbeat: Instant,
}

impl ConnectionActor {
    fn new(srv_tx: ServerTx, config: &Config) -> Self {
        Self {
            state: ConnectionState::Idle,
            srv_tx,
            buffer: config.connection_buffer.max(1),
            heartbeat_interval: config.heartbeat_interval(),
            client_timeout: config.client_timeout(),
            last_heartbeat: Instant::now(),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat_interval, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > act.client_timeout {
                log::info!("Connection timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    /// Holds further frames of this connection until the dispatch task has room, so a
    /// client's events reach the relay in order and none are lost to a full queue.
    fn ingress(&self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        if let Some(command) = self.state.route_ingress(text) {
            let srv_tx = self.srv_tx.clone();
            ctx.wait(
                async move {
                    if srv_tx.send(command).await.is_err() {
                        log::error!("Relay dispatch is gone");
                    }
                }
                .into_actor(self),
            );
        }
    }
}

/// Hands a lifecycle command to the dispatch task without losing it to a full buffer.
fn submit(srv_tx: &ServerTx, command: ServerCommand) {
    let srv_tx = srv_tx.clone();
    tokio::spawn(async move {
        if srv_tx.send(command).await.is_err() {
            log::error!("Relay dispatch is gone");
        }
    });
}

/// Forwards egress events into the actor, waiting for mailbox room. When the actor is
/// already gone, this is the last place that knows the client is attached, so it detaches it.
async fn forward_egress(
    mut rx: tokio::sync::mpsc::Receiver<ConnectionEvent>,
    addr: Recipient<ConnectionActorMessage>,
    srv_tx: ServerTx,
) {
    let mut attached = None;
    while let Some(event) = rx.recv().await {
        if let ConnectionEvent::Attached { client_id } = event {
            attached = Some(client_id);
        }
        if addr.send(ConnectionActorMessage(event)).await.is_err() {
            if let Some(from) = attached {
                submit(&srv_tx, ServerCommand::Disconnect { from });
            }
            break;
        }
    }
    log::debug!("Connection egress task terminated");
}

impl Actor for ConnectionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.start_heartbeat(ctx);

        let (tx, rx) = tokio::sync::mpsc::channel::<ConnectionEvent>(self.buffer);
        submit(&self.srv_tx, ServerCommand::Connect { tx });

        let addr = ctx.address().recipient();
        tokio::spawn(forward_egress(rx, addr, self.srv_tx.clone()));
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if let ConnectionState::Attached(from) =
            std::mem::replace(&mut self.state, ConnectionState::Detached)
        {
            submit(&self.srv_tx, ServerCommand::Disconnect { from });
        }

        Running::Stop
    }
}

/// Ingress
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ConnectionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("WebSocket protocol error: {}", e);
                ctx.stop();
                return;
            }
        };
        match msg {
            ws::Message::Ping(bytes) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&bytes);
            }
            ws::Message::Pong(_) => self.last_heartbeat = Instant::now(),
            ws::Message::Text(text) => {
                self.last_heartbeat = Instant::now();
                self.ingress(&text, ctx);
            }
            ws::Message::Binary(bin) => {
                self.last_heartbeat = Instant::now();
                log::warn!("Dropped binary frame ({} bytes)", bin.len());
            }
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
            ws::Message::Continuation(_) | ws::Message::Nop => (),
        }
    }
}

/// Egress
impl Handler<ConnectionActorMessage> for ConnectionActor {
    type Result = ();

    fn handle(
        &mut self,
        msg: ConnectionActorMessage,
        ctx: &mut ws::WebsocketContext<Self>,
    ) -> Self::Result {
        let connection_event = msg.0;
        log::debug!("Egress {:?}", connection_event);
        match connection_event {
            ConnectionEvent::Attached { client_id } => {
                if let Some(command) = self.state.confirm_attach(client_id) {
                    submit(&self.srv_tx, command);
                }
            }
            ConnectionEvent::Message(message) => match encode(&message) {
                Ok(text) => ctx.text(text),
                Err(e) => log::error!("Skipped {}: {}", message.event_name(), e),
            },
            ConnectionEvent::Rejected { reason } => {
                ctx.close(Some(CloseReason {
                    code: CloseCode::Again,
                    description: Some(reason),
                }));
                ctx.stop();
            }
        }
    }
}

pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    srv_tx: web::Data<ServerTx>,
    config: web::Data<Config>,
) -> Result<HttpResponse, Error> {
    ws::start(
        ConnectionActor::new(srv_tx.get_ref().clone(), &config),
        &req,
        stream,
    )
}
