/// Lobby: the single owner of all matchmaking state.
///
/// Holds the connection registry, the waiting queue and the match sessions
/// together so that pairing, session creation and teardown always see a
/// consistent view of the three. Every operation runs to completion and
/// records its outgoing messages in an [`Outbox`].
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::config::matchmaking::WELCOME_MESSAGE;
use crate::config::server::MatchRules;

use super::messages::{ClientEvent, GoalPayload, ServerEvent, Stats};
use super::outbox::Outbox;
use super::queue::{EnqueueOutcome, MatchQueue};
use super::reaper;
use super::registry::ConnectionRegistry;
use super::relay;
use super::sessions::{GoalOutcome, SessionManager};
use super::types::ConnectionId;

#[derive(Debug, Default)]
pub struct Lobby {
    registry: ConnectionRegistry,
    queue: MatchQueue,
    sessions: SessionManager,
    rules: MatchRules,
}

impl Lobby {
    pub fn new(rules: MatchRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Current aggregate counters.
    pub fn stats(&self) -> Stats {
        Stats {
            total: self.registry.len(),
            queued: self.queue.len(),
            active_sessions: self.sessions.len(),
        }
    }

    fn broadcast_stats(&self, outbox: &mut Outbox) {
        outbox.broadcast(ServerEvent::PlayersOnline(self.stats()));
    }

    /// A new socket is open.
    pub fn connect(&mut self, id: ConnectionId, outbox: &mut Outbox) {
        self.registry.register(id);
        info!("[Matchmaking] Player {} connected ({} online)", id, self.registry.len());
        outbox.send_to(
            id,
            ServerEvent::Connected {
                your_id: id,
                total_players: self.registry.len(),
                message: WELCOME_MESSAGE.to_string(),
            },
        );
        self.broadcast_stats(outbox);
    }

    /// A socket closed: leave the queue or the session, then forget the connection.
    pub fn disconnect(&mut self, id: ConnectionId, outbox: &mut Outbox) {
        if !self.registry.contains(&id) {
            return;
        }
        if self.queue.withdraw(&mut self.registry, &id) {
            debug!("[Matchmaking] Player {} removed from queue on disconnect", id);
        } else if let Some(session) = self.sessions.end_session_on_disconnect(&mut self.registry, &id, outbox) {
            debug!("[Matchmaking] Player {} left session {}", id, session.id);
        }
        self.registry.unregister(&id);
        info!("[Matchmaking] Player {} disconnected ({} online)", id, self.registry.len());

        outbox.broadcast(ServerEvent::PlayerLeft { player_id: id });
        self.broadcast_stats(outbox);
    }

    /// Dispatch one decoded client event.
    pub fn handle(&mut self, id: ConnectionId, event: ClientEvent, outbox: &mut Outbox) {
        if !self.registry.contains(&id) {
            debug!("[Matchmaking] '{}' from unknown connection {} ignored", event.name(), id);
            return;
        }
        match event {
            ClientEvent::JoinQueue => self.join_queue(id, outbox),
            ClientEvent::LeaveQueue => self.leave_queue(id, outbox),
            ClientEvent::Ready => self.sessions.mark_ready(&mut self.registry, id, outbox),
            ClientEvent::Goal(payload) => self.record_goal(id, payload, outbox),
            ClientEvent::Movement(position) => {
                relay::relay_movement(&self.registry, &self.sessions, id, position, outbox);
            }
            ClientEvent::Kick(kick) => {
                relay::relay_kick(&self.registry, &self.sessions, id, kick, outbox);
            }
            ClientEvent::Possession(possession) => {
                relay::relay_possession(&self.registry, &self.sessions, id, possession, outbox);
            }
        }
    }

    /// Enqueue the player, then pair as many waiting players as possible.
    pub fn join_queue(&mut self, id: ConnectionId, outbox: &mut Outbox) {
        match self.queue.enqueue(&mut self.registry, id) {
            EnqueueOutcome::Added(position) => {
                debug!("[Matchmaking] Player {} queued at position {}", id, position);
                outbox.send_to(id, ServerEvent::JoinedQueue { position });
                self.pair_waiting(outbox);
                self.broadcast_stats(outbox);
            }
            EnqueueOutcome::AlreadyQueued(position) => {
                outbox.send_to(id, ServerEvent::JoinedQueue { position });
            }
            EnqueueOutcome::Rejected => {}
        }
    }

    fn pair_waiting(&mut self, outbox: &mut Outbox) {
        while let Some((first, second)) = self.queue.dequeue_pair(&mut self.registry) {
            self.sessions
                .create_session(&mut self.registry, first, second, Instant::now(), outbox);
        }
    }

    pub fn leave_queue(&mut self, id: ConnectionId, outbox: &mut Outbox) {
        let removed = self.queue.withdraw(&mut self.registry, &id);
        outbox.send_to(id, ServerEvent::LeftQueue);
        if removed {
            debug!("[Matchmaking] Player {} left the queue", id);
            self.broadcast_stats(outbox);
        }
    }

    fn record_goal(&mut self, id: ConnectionId, payload: GoalPayload, outbox: &mut Outbox) {
        let outcome = self
            .sessions
            .record_goal(&mut self.registry, id, payload, self.rules.goal_limit, outbox);
        if outcome == GoalOutcome::MatchOver {
            self.broadcast_stats(outbox);
        }
    }

    /// Destroy sessions older than `max_age`. Returns how many were removed.
    pub fn reap(&mut self, now: Instant, max_age: Duration, outbox: &mut Outbox) -> usize {
        let destroyed = reaper::sweep(&mut self.sessions, &mut self.registry, now, max_age, outbox);
        if !destroyed.is_empty() {
            self.broadcast_stats(outbox);
        }
        destroyed.len()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
