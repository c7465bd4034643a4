//! Backend of a 1-vs-1 real-time football game.
//!
//! Clients connect over WebSocket, join a matchmaking queue, get paired into
//! a two-player session and exchange gameplay events relayed to their
//! opponent only.

pub mod config;
pub mod server;
