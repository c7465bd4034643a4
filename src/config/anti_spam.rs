/// Configuration for inbound flood protection.
/// Movement frames are sent every render tick, so the limit is generous.
pub const MAX_FRAMES_PER_SECOND: u32 = 120;
