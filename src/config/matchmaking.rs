/// Matchmaking configuration constants.
///
/// This module defines parameters for match sessions, such as the reaper
/// schedule and the maximum lifetime of a session.
pub const REAPER_INTERVAL_SECS: u64 = 60; // Delay between two reaper sweeps (in seconds).

/// Age (in seconds) after which a session is considered abandoned and destroyed by the reaper.
pub const SESSION_MAX_AGE_SECS: u64 = 30 * 60;

/// Number of players in a match session.
pub const PLAYERS_PER_SESSION: usize = 2;

/// Greeting sent with the `conectado` event.
pub const WELCOME_MESSAGE: &str = "Conectado ao servidor Mamoball!";

/// Delay between two WebSocket pings sent to each client (in seconds).
pub const HEARTBEAT_INTERVAL_SECS: u64 = 10;

/// A client silent for this long (no pong, ping or text frame) is disconnected.
pub const CLIENT_TIMEOUT_SECS: u64 = 30;
