/// Connection registry.
///
/// Owns the per-connection state (queued flag, current session, ready flag).
/// The queue and the session manager only hold ids and go through here to
/// read or change that state.
use std::collections::HashMap;
use std::time::Instant;

use log::warn;

use super::types::{ConnectionId, SessionId};

/// State of one live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub queued: bool,
    pub session_id: Option<SessionId>,
    pub ready: bool,
    pub connected_at: Instant,
}

impl Connection {
    fn new(id: ConnectionId) -> Self {
        Self {
            id,
            queued: false,
            session_id: None,
            ready: false,
            connected_at: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh connection. An existing record with the same id is replaced.
    pub fn register(&mut self, id: ConnectionId) -> &Connection {
        if self.connections.contains_key(&id) {
            warn!("[Registry] Connection {} registered twice, resetting its state", id);
        }
        self.connections.insert(id, Connection::new(id));
        &self.connections[&id]
    }

    /// Forget a connection. Returns the removed record, if any.
    pub fn unregister(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// Session the connection currently plays in.
    pub fn session_of(&self, id: &ConnectionId) -> Option<&SessionId> {
        self.connections.get(id).and_then(|c| c.session_id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
