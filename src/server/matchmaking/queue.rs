/// Matchmaking queue.
///
/// FIFO list of connections waiting for an opponent. An id appears at most
/// once and never while its connection is in a session.
use std::collections::VecDeque;

use log::debug;

use super::registry::ConnectionRegistry;
use super::types::ConnectionId;

/// Result of an enqueue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended at the given 1-based position.
    Added(usize),
    /// Already waiting at the given 1-based position.
    AlreadyQueued(usize),
    /// Unknown connection or connection already playing.
    Rejected,
}

#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<ConnectionId>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, registry: &mut ConnectionRegistry, id: ConnectionId) -> EnqueueOutcome {
        let Some(conn) = registry.get_mut(&id) else {
            return EnqueueOutcome::Rejected;
        };
        if conn.session_id.is_some() {
            debug!("[Matchmaking] {} asked to queue while in a session, ignored", id);
            return EnqueueOutcome::Rejected;
        }
        if let Some(pos) = self.position(&id) {
            conn.queued = true;
            return EnqueueOutcome::AlreadyQueued(pos);
        }
        conn.queued = true;
        self.waiting.push_back(id);
        EnqueueOutcome::Added(self.waiting.len())
    }

    /// Pop the two oldest entries if at least two are waiting.
    pub fn dequeue_pair(&mut self, registry: &mut ConnectionRegistry) -> Option<(ConnectionId, ConnectionId)> {
        if self.waiting.len() < 2 {
            return None;
        }
        let first = self.waiting.pop_front()?;
        let second = self.waiting.pop_front()?;
        for id in [first, second] {
            if let Some(conn) = registry.get_mut(&id) {
                conn.queued = false;
            }
        }
        Some((first, second))
    }

    /// Remove an id from the queue. Returns whether it was waiting.
    pub fn withdraw(&mut self, registry: &mut ConnectionRegistry, id: &ConnectionId) -> bool {
        if let Some(conn) = registry.get_mut(id) {
            conn.queued = false;
        }
        let before = self.waiting.len();
        self.waiting.retain(|queued| queued != id);
        before != self.waiting.len()
    }

    /// 1-based position of a waiting id.
    pub fn position(&self, id: &ConnectionId) -> Option<usize> {
        self.waiting.iter().position(|queued| queued == id).map(|idx| idx + 1)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.waiting.contains(id)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionId> {
        self.waiting.iter()
    }
}
