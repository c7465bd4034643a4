use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of one live WebSocket connection.
/// Assigned at connect time, stable for the lifetime of the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a match session ("sala").
///
/// Built from the creation time in milliseconds plus a per-process sequence
/// number, so two sessions created in the same millisecond still differ.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic session id allocator. One instance lives in the session manager.
#[derive(Debug, Default)]
pub struct SessionIdGenerator {
    next_seq: u64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id stamped with the given unix time in milliseconds.
    pub fn next(&mut self, unix_millis: i64) -> SessionId {
        let seq = self.next_seq;
        self.next_seq += 1;
        SessionId(format!("sala_{}_{}", unix_millis, seq))
    }

    /// Allocate a fresh id stamped with the current wall-clock time.
    pub fn next_now(&mut self) -> SessionId {
        self.next(chrono::Utc::now().timestamp_millis())
    }
}
