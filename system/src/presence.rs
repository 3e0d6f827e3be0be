use crate::{ClientId, Outbox, RelayMessage};

/// Sends `user_count` to every member, the one that triggered the change included.
///
/// Returns how many members the count actually reached.
pub fn announce<O: Outbox>(members: &[ClientId], count: usize, outbox: &mut O) -> usize {
    let message = RelayMessage::UserCount(count);
    let mut delivered = 0;
    for client_id in members {
        match outbox.deliver(client_id, &message) {
            Ok(()) => delivered += 1,
            Err(e) => log::warn!("Skipped presence update: {}", e),
        }
    }
    delivered
}
