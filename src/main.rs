//! Main entry point for the backend server.
//!
//! Initializes logging, reads the configuration, starts the matchmaking
//! actor and launches the HTTP server with the WebSocket game endpoint.

use std::io;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use mamoball_server::config::server::ServerConfig;
use mamoball_server::server::matchmaking::server::MatchServer;
use mamoball_server::server::{router, state::AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // Start the MatchServer actor (queue, sessions, relay, reaper).
    let match_server = MatchServer::new(config.rules, config.reaper).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(AppState::new(match_server));

    info!("[Server] Listening on 0.0.0.0:{}", config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
                    .add(("Access-Control-Allow-Methods", "GET, POST")),
            )
            .app_data(state.clone())
            .configure(router::config)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
