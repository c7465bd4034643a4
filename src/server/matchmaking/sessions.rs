/// Match session manager.
///
/// A session pairs exactly two connections and keeps their score. Sessions
/// are created from a queue pair and destroyed on disconnect, on expiry
/// (reaper) or when the goal limit is reached.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::matchmaking::PLAYERS_PER_SESSION;

use super::messages::{GoalPayload, Scoreboard, ServerEvent, TeardownReason};
use super::outbox::Outbox;
use super::registry::ConnectionRegistry;
use super::types::{ConnectionId, SessionId, SessionIdGenerator};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchSession {
    pub id: SessionId,
    /// Player one first, in pairing order.
    pub players: [ConnectionId; PLAYERS_PER_SESSION],
    pub created_at: Instant,
    pub score: Scoreboard,
}

impl MatchSession {
    /// The other participant, if `id` plays in this session.
    pub fn opponent_of(&self, id: &ConnectionId) -> Option<ConnectionId> {
        match self.players {
            [a, b] if a == *id => Some(b),
            [a, b] if b == *id => Some(a),
            _ => None,
        }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// What a `gol` event led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    /// Sender is not in a session; nothing happened.
    Ignored,
    Scored,
    /// The goal reached the limit and the session was closed.
    MatchOver,
}

#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<SessionId, MatchSession>,
    ids: SessionIdGenerator,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for a freshly dequeued pair and notify both players.
    ///
    /// `first` becomes player one. Returns `None` if either connection is gone
    /// or already playing.
    pub fn create_session(
        &mut self,
        registry: &mut ConnectionRegistry,
        first: ConnectionId,
        second: ConnectionId,
        created_at: Instant,
        outbox: &mut Outbox,
    ) -> Option<SessionId> {
        if first == second {
            warn!("[Session] Refusing to pair {} with itself", first);
            return None;
        }
        let available = |id: &ConnectionId| registry.get(id).is_some_and(|c| c.session_id.is_none());
        if !available(&first) || !available(&second) {
            warn!("[Session] Pair ({}, {}) is no longer available", first, second);
            return None;
        }

        let session_id = self.ids.next_now();
        for id in [first, second] {
            if let Some(conn) = registry.get_mut(&id) {
                conn.session_id = Some(session_id.clone());
                conn.queued = false;
                conn.ready = false;
            }
        }

        let score: Scoreboard = [(first, 0), (second, 0)].into_iter().collect();
        self.sessions.insert(
            session_id.clone(),
            MatchSession {
                id: session_id.clone(),
                players: [first, second],
                created_at,
                score,
            },
        );

        outbox.send_to(
            first,
            ServerEvent::MatchFound {
                session_id: session_id.clone(),
                opponent_id: second,
                is_player_one: true,
            },
        );
        outbox.send_to(
            second,
            ServerEvent::MatchFound {
                session_id: session_id.clone(),
                opponent_id: first,
                is_player_one: false,
            },
        );

        info!("[Session] Session {} created for {} vs {}", session_id, first, second);
        Some(session_id)
    }

    /// Flag the player as ready and tell its opponent.
    pub fn mark_ready(&self, registry: &mut ConnectionRegistry, id: ConnectionId, outbox: &mut Outbox) {
        let Some(conn) = registry.get_mut(&id) else {
            return;
        };
        conn.ready = true;
        let Some(opponent) = conn.session_id.as_ref().and_then(|sid| self.opponent_in(sid, &id)) else {
            return;
        };
        outbox.send_to(opponent, ServerEvent::OpponentReady { player_id: id });
    }

    /// Count a goal for `id` and publish the new score to both players.
    pub fn record_goal(
        &mut self,
        registry: &mut ConnectionRegistry,
        id: ConnectionId,
        payload: GoalPayload,
        goal_limit: Option<u32>,
        outbox: &mut Outbox,
    ) -> GoalOutcome {
        let Some(session_id) = registry.session_of(&id).cloned() else {
            debug!("[Session] Goal from {} outside of a session dropped", id);
            return GoalOutcome::Ignored;
        };
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return GoalOutcome::Ignored;
        };
        let Some(goals) = session.score.get_mut(&id) else {
            return GoalOutcome::Ignored;
        };
        *goals = goals.saturating_add(1);
        let goals = *goals;

        for player in session.players {
            outbox.send_to(
                player,
                ServerEvent::GoalScored {
                    player_id: id,
                    team: payload.team.clone(),
                    score: session.score.clone(),
                },
            );
        }
        info!("[Session] Goal by {} in {} ({} goals)", id, session_id, goals);

        if goal_limit.is_some_and(|limit| goals >= limit) {
            for player in session.players {
                outbox.send_to(
                    player,
                    ServerEvent::MatchFinished {
                        session_id: session_id.clone(),
                        winner_id: id,
                        score: session.score.clone(),
                    },
                );
            }
            self.destroy_session(registry, &session_id, TeardownReason::Finished, outbox);
            return GoalOutcome::MatchOver;
        }
        GoalOutcome::Scored
    }

    /// Remove a session and detach its players.
    ///
    /// Every participant still pointing at the session is released and, unless
    /// the match finished normally, told why the session ended.
    pub fn destroy_session(
        &mut self,
        registry: &mut ConnectionRegistry,
        session_id: &SessionId,
        reason: TeardownReason,
        outbox: &mut Outbox,
    ) -> Option<MatchSession> {
        let session = self.sessions.remove(session_id)?;
        for player in session.players {
            let Some(conn) = registry.get_mut(&player) else {
                continue;
            };
            if conn.session_id.as_ref() != Some(session_id) {
                continue;
            }
            conn.session_id = None;
            conn.ready = false;
            if reason != TeardownReason::Finished {
                outbox.send_to(
                    player,
                    ServerEvent::OpponentDisconnected {
                        session_id: session_id.clone(),
                        reason,
                    },
                );
            }
        }
        info!("[Session] Session {} destroyed ({:?})", session_id, reason);
        Some(session)
    }

    /// Tear down the session of a connection that is going away.
    pub fn end_session_on_disconnect(
        &mut self,
        registry: &mut ConnectionRegistry,
        id: &ConnectionId,
        outbox: &mut Outbox,
    ) -> Option<MatchSession> {
        let conn = registry.get_mut(id)?;
        let session_id = conn.session_id.take()?;
        conn.ready = false;
        self.destroy_session(registry, &session_id, TeardownReason::OpponentDisconnected, outbox)
    }

    /// Opponent of `id` inside the given session.
    pub fn opponent_in(&self, session_id: &SessionId, id: &ConnectionId) -> Option<ConnectionId> {
        self.sessions.get(session_id).and_then(|s| s.opponent_of(id))
    }

    /// Ids of sessions strictly older than `max_age` at `now`.
    pub fn expired(&self, now: Instant, max_age: Duration) -> Vec<SessionId> {
        self.sessions
            .values()
            .filter(|s| s.age(now) > max_age)
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&MatchSession> {
        self.sessions.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paired() -> (ConnectionRegistry, SessionManager, SessionId, ConnectionId, ConnectionId) {
        let mut registry = ConnectionRegistry::new();
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        registry.register(a);
        registry.register(b);
        let mut sessions = SessionManager::new();
        let mut outbox = Outbox::new();
        let sid = sessions.create_session(&mut registry, a, b, Instant::now(), &mut outbox).unwrap();
        (registry, sessions, sid, a, b)
    }

    fn goal(team: &str) -> GoalPayload {
        GoalPayload { team: Some(json!(team)) }
    }

    #[test]
    fn test_create_session_links_both_players() {
        let mut registry = ConnectionRegistry::new();
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        registry.register(a);
        registry.register(b);
        let mut sessions = SessionManager::new();
        let mut outbox = Outbox::new();

        let sid = sessions.create_session(&mut registry, a, b, Instant::now(), &mut outbox).unwrap();

        assert_eq!(registry.session_of(&a), Some(&sid));
        assert_eq!(registry.session_of(&b), Some(&sid));
        let session = sessions.get(&sid).unwrap();
        assert_eq!(session.players, [a, b]);
        assert_eq!(session.score.values().copied().collect::<Vec<_>>(), vec![0, 0]);
        assert_eq!(
            outbox.sent_to(&a),
            vec![&ServerEvent::MatchFound { session_id: sid.clone(), opponent_id: b, is_player_one: true }]
        );
        assert_eq!(
            outbox.sent_to(&b),
            vec![&ServerEvent::MatchFound { session_id: sid.clone(), opponent_id: a, is_player_one: false }]
        );
    }

    #[test]
    fn test_create_session_refuses_busy_or_missing_players() {
        let (mut registry, mut sessions, _sid, a, _b) = paired();
        let c = ConnectionId::new();
        registry.register(c);
        let mut outbox = Outbox::new();
        assert!(sessions.create_session(&mut registry, a, c, Instant::now(), &mut outbox).is_none());
        assert!(sessions.create_session(&mut registry, c, c, Instant::now(), &mut outbox).is_none());
        assert!(sessions.create_session(&mut registry, c, ConnectionId::new(), Instant::now(), &mut outbox).is_none());
        assert_eq!(sessions.len(), 1);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_mark_ready_notifies_only_opponent() {
        let (mut registry, sessions, _sid, a, b) = paired();
        let mut outbox = Outbox::new();
        sessions.mark_ready(&mut registry, a, &mut outbox);
        assert!(registry.get(&a).unwrap().ready);
        assert!(outbox.sent_to(&a).is_empty());
        assert_eq!(outbox.sent_to(&b), vec![&ServerEvent::OpponentReady { player_id: a }]);
    }

    #[test]
    fn test_mark_ready_without_session_only_sets_flag() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        registry.register(a);
        let sessions = SessionManager::new();
        let mut outbox = Outbox::new();
        sessions.mark_ready(&mut registry, a, &mut outbox);
        assert!(registry.get(&a).unwrap().ready);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_record_goal_updates_score_and_notifies_both() {
        let (mut registry, mut sessions, sid, a, b) = paired();
        let mut outbox = Outbox::new();
        let outcome = sessions.record_goal(&mut registry, a, goal("A"), None, &mut outbox);
        assert_eq!(outcome, GoalOutcome::Scored);

        let expected_score: Scoreboard = [(a, 1), (b, 0)].into_iter().collect();
        assert_eq!(sessions.get(&sid).unwrap().score, expected_score);
        let expected = ServerEvent::GoalScored { player_id: a, team: Some(json!("A")), score: expected_score };
        assert_eq!(outbox.sent_to(&a), vec![&expected]);
        assert_eq!(outbox.sent_to(&b), vec![&expected]);
    }

    #[test]
    fn test_record_goal_saturates_instead_of_overflowing() {
        let (mut registry, mut sessions, sid, a, _b) = paired();
        sessions.sessions.get_mut(&sid).unwrap().score.insert(a, u32::MAX);
        let mut outbox = Outbox::new();
        let outcome = sessions.record_goal(&mut registry, a, goal("A"), None, &mut outbox);
        assert_eq!(outcome, GoalOutcome::Scored);
        assert_eq!(sessions.get(&sid).unwrap().score[&a], u32::MAX);
        assert_eq!(outbox.len(), 2);
    }

    #[test]
    fn test_record_goal_outside_session_is_ignored() {
        let (mut registry, mut sessions, sid, a, b) = paired();
        let loner = ConnectionId::new();
        registry.register(loner);
        let mut outbox = Outbox::new();
        let outcome = sessions.record_goal(&mut registry, loner, goal("A"), None, &mut outbox);
        assert_eq!(outcome, GoalOutcome::Ignored);
        assert!(outbox.is_empty());
        let score = &sessions.get(&sid).unwrap().score;
        assert_eq!((score[&a], score[&b]), (0, 0));
    }

    #[test]
    fn test_goal_limit_finishes_the_match() {
        let (mut registry, mut sessions, sid, a, b) = paired();
        let mut outbox = Outbox::new();
        assert_eq!(sessions.record_goal(&mut registry, b, goal("B"), Some(2), &mut outbox), GoalOutcome::Scored);
        assert_eq!(sessions.record_goal(&mut registry, b, goal("B"), Some(2), &mut outbox), GoalOutcome::MatchOver);

        assert!(sessions.is_empty());
        assert!(registry.session_of(&a).is_none());
        assert!(registry.session_of(&b).is_none());
        let finished = outbox
            .sent_to(&a)
            .into_iter()
            .any(|e| matches!(e, ServerEvent::MatchFinished { session_id, winner_id, .. } if *session_id == sid && *winner_id == b));
        assert!(finished);
        let disconnected = outbox
            .iter()
            .any(|d| matches!(d, super::super::outbox::Delivery::To(_, ServerEvent::OpponentDisconnected { .. })));
        assert!(!disconnected);
    }

    #[test]
    fn test_disconnect_destroys_session_and_notifies_other() {
        let (mut registry, mut sessions, sid, a, b) = paired();
        let mut outbox = Outbox::new();
        let removed = sessions.end_session_on_disconnect(&mut registry, &a, &mut outbox).unwrap();
        assert_eq!(removed.id, sid);
        assert!(sessions.is_empty());
        assert!(registry.session_of(&b).is_none());
        assert!(outbox.sent_to(&a).is_empty());
        assert_eq!(
            outbox.sent_to(&b),
            vec![&ServerEvent::OpponentDisconnected { session_id: sid, reason: TeardownReason::OpponentDisconnected }]
        );
    }

    #[test]
    fn test_destroy_session_skips_players_already_gone() {
        let (mut registry, mut sessions, sid, a, b) = paired();
        registry.unregister(&a);
        let mut outbox = Outbox::new();
        sessions.destroy_session(&mut registry, &sid, TeardownReason::Expired, &mut outbox);
        assert_eq!(
            outbox.sent_to(&b),
            vec![&ServerEvent::OpponentDisconnected { session_id: sid.clone(), reason: TeardownReason::Expired }]
        );
        assert_eq!(outbox.len(), 1);
        assert!(sessions.destroy_session(&mut registry, &sid, TeardownReason::Expired, &mut outbox).is_none());
    }

    #[test]
    fn test_expired_uses_strict_age() {
        let (_registry, sessions, sid, _a, _b) = paired();
        let created = sessions.get(&sid).unwrap().created_at;
        let max_age = Duration::from_secs(60);
        assert!(sessions.expired(created + max_age, max_age).is_empty());
        assert_eq!(sessions.expired(created + max_age + Duration::from_secs(1), max_age), vec![sid]);
    }
}
