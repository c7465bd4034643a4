// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing and the plain HTTP endpoints
//! - Matchmaking logic (queue, match sessions, gameplay relay, reaper)
//! - Inbound flood protection

pub mod state;
pub mod router;
pub mod http;
pub mod matchmaking;
pub mod anti_spam;
