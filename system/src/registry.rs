use crate::{ClientId, RelayError};

/// Membership of the room. The only place the client count lives.
pub struct ConnectionRegistry {
    members: Vec<ClientId>,
    capacity: Option<usize>,
}

impl ConnectionRegistry {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            members: Vec::new(),
            capacity,
        }
    }

    pub fn attach(&mut self) -> Result<ClientId, RelayError> {
        if let Some(limit) = self.capacity {
            if self.members.len() >= limit {
                return Err(RelayError::CapacityExceeded { limit });
            }
        }
        let client_id = ClientId::new();
        self.members.push(client_id);
        Ok(client_id)
    }

    /// Returns `false` when `client_id` was not a member; the membership is left untouched.
    pub fn detach(&mut self, client_id: &ClientId) -> bool {
        let before = self.members.len();
        self.members.retain(|c| c != client_id);
        self.members.len() != before
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Members in attach order.
    pub fn members(&self) -> &[ClientId] {
        self.members.as_slice()
    }
}
