/// Matchmaking module: connection registry, waiting queue, match sessions,
/// gameplay relay and the session reaper, driven by one server actor.

pub mod types;
pub mod messages;
pub mod outbox;
pub mod registry;
pub mod queue;
pub mod sessions;
pub mod relay;
pub mod reaper;
pub mod lobby;
pub mod server;
pub mod ws_session;
