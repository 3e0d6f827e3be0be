use crate::{ClientId, ClientMessage, Outbox, RelayMessage};

/// Turns an inbound event into what the sender's peers receive.
///
/// Code and pin payloads pass through untouched. Cursor ids are overwritten with the
/// sender's id so that observers key each peer's cursor on a value the client can't forge.
pub fn forwarded(sender: &ClientId, message: ClientMessage) -> RelayMessage {
    match message {
        ClientMessage::SendCode(code) => RelayMessage::ReceiveCode(code),
        ClientMessage::SendPin(pin) => RelayMessage::ReceivePin(pin),
        ClientMessage::SendCursor(mut cursor) => {
            let id = sender.to_string();
            if cursor.id != id {
                log::debug!("Cursor id {:?} replaced with sender id {}", cursor.id, id);
                cursor.id = id;
            }
            RelayMessage::ReceiveCursor(cursor)
        }
    }
}

/// Excluded-sender fan-out. Returns how many peers the event reached.
pub fn relay<O: Outbox>(
    sender: &ClientId,
    members: &[ClientId],
    message: ClientMessage,
    outbox: &mut O,
) -> usize {
    if !members.contains(sender) {
        log::warn!(
            "Dropped {} from {}, not attached",
            message.event_name(),
            sender
        );
        return 0;
    }

    let message = forwarded(sender, message);
    let mut delivered = 0;
    for client_id in members.iter().filter(|c| *c != sender) {
        match outbox.deliver(client_id, &message) {
            Ok(()) => delivered += 1,
            Err(e) => log::warn!("Skipped {}: {}", message.event_name(), e),
        }
    }
    delivered
}
