/// Session reaper.
///
/// Destroys sessions that outlived the maximum age, e.g. when both clients
/// vanished without a clean close. Scheduled by the matchmaking server actor.
use std::time::{Duration, Instant};

use log::info;

use super::messages::TeardownReason;
use super::outbox::Outbox;
use super::registry::ConnectionRegistry;
use super::sessions::SessionManager;
use super::types::SessionId;

/// Destroy every session older than `max_age` at `now`. Returns the destroyed ids.
pub fn sweep(
    sessions: &mut SessionManager,
    registry: &mut ConnectionRegistry,
    now: Instant,
    max_age: Duration,
    outbox: &mut Outbox,
) -> Vec<SessionId> {
    let expired = sessions.expired(now, max_age);
    for session_id in &expired {
        sessions.destroy_session(registry, session_id, TeardownReason::Expired, outbox);
    }
    if !expired.is_empty() {
        info!("[Reaper] {} expired session(s) destroyed", expired.len());
    }
    expired
}
