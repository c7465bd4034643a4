use std::fmt::Display;
use std::time::{Duration, Instant};
use log::warn;

use crate::config::anti_spam::MAX_FRAMES_PER_SECOND;

/// Tracks inbound frame rate for a single WebSocket connection.
///
/// Frames above the per-second limit are dropped; the connection is never
/// closed and the client gets no reply.
pub struct AntiSpamState {
    // Timestamp of last reset (for per-second counters)
    last_tick: Instant,
    // Number of frames received in the current second
    frames_this_tick: u32,
    // Frames dropped in the current second, for a single warning per burst
    dropped_this_tick: u32,
    limit: u32,
}

impl Default for AntiSpamState {
    fn default() -> Self {
        Self::new()
    }
}

impl AntiSpamState {
    pub fn new() -> Self {
        Self::with_limit(MAX_FRAMES_PER_SECOND)
    }

    pub fn with_limit(limit: u32) -> Self {
        Self {
            last_tick: Instant::now(),
            frames_this_tick: 0,
            dropped_this_tick: 0,
            limit,
        }
    }

    /// Call for every incoming frame. Returns true if the frame may be processed.
    pub fn record_frame(&mut self, connection: impl Display) -> bool {
        self.record_frame_at(connection, Instant::now())
    }

    fn record_frame_at(&mut self, connection: impl Display, now: Instant) -> bool {
        self.tick(now);
        self.frames_this_tick += 1;
        if self.frames_this_tick <= self.limit {
            return true;
        }
        if self.dropped_this_tick == 0 {
            warn!("[AntiSpam] Connection {} exceeded {} frames/s, dropping", connection, self.limit);
        }
        self.dropped_this_tick += 1;
        false
    }

    /// Reset per-second counters if a new second has started.
    fn tick(&mut self, now: Instant) {
        if now.duration_since(self.last_tick) >= Duration::from_secs(1) {
            self.last_tick = now;
            self.frames_this_tick = 0;
            self.dropped_this_tick = 0;
        }
    }
}
