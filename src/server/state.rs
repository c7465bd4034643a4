// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the address of the matchmaking server actor so HTTP and WebSocket
//! handlers can reach it.

use actix::Addr;
use crate::server::matchmaking::server::MatchServer;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the matchmaking server actor (queue, sessions, relay).
    pub match_server: Addr<MatchServer>,
}

impl AppState {
    pub fn new(match_server: Addr<MatchServer>) -> Self {
        AppState { match_server }
    }
}
