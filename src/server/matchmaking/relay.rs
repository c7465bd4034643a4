/// Gameplay event relay.
///
/// Forwards movement, kick and possession frames from a player to the other
/// participant of its session, and to nobody else. Frames from connections
/// without a session are dropped without a reply.
use log::trace;
use serde_json::Value;

use super::messages::{KickPayload, PossessionPayload, ServerEvent};
use super::outbox::Outbox;
use super::registry::ConnectionRegistry;
use super::sessions::SessionManager;
use super::types::ConnectionId;

/// Resolve the session opponent of `from`.
pub fn opponent_of(
    registry: &ConnectionRegistry,
    sessions: &SessionManager,
    from: &ConnectionId,
) -> Option<ConnectionId> {
    let session_id = registry.session_of(from)?;
    sessions.opponent_in(session_id, from)
}

fn forward(
    registry: &ConnectionRegistry,
    sessions: &SessionManager,
    from: ConnectionId,
    outbox: &mut Outbox,
    event: impl FnOnce() -> ServerEvent,
) -> bool {
    match opponent_of(registry, sessions, &from) {
        Some(opponent) => {
            outbox.send_to(opponent, event());
            true
        }
        None => {
            trace!("[Relay] Dropped frame from {} (no session)", from);
            false
        }
    }
}

pub fn relay_movement(
    registry: &ConnectionRegistry,
    sessions: &SessionManager,
    from: ConnectionId,
    position: Value,
    outbox: &mut Outbox,
) -> bool {
    forward(registry, sessions, from, outbox, || ServerEvent::OpponentMoved {
        player_id: from,
        position,
    })
}

pub fn relay_kick(
    registry: &ConnectionRegistry,
    sessions: &SessionManager,
    from: ConnectionId,
    kick: KickPayload,
    outbox: &mut Outbox,
) -> bool {
    forward(registry, sessions, from, outbox, || ServerEvent::OpponentKicked {
        player_id: from,
        force: kick.force,
        direction: kick.direction,
    })
}

pub fn relay_possession(
    registry: &ConnectionRegistry,
    sessions: &SessionManager,
    from: ConnectionId,
    possession: PossessionPayload,
    outbox: &mut Outbox,
) -> bool {
    forward(registry, sessions, from, outbox, || ServerEvent::OpponentPossession {
        player_id: from,
        has_possession: possession.has_possession,
    })
}
