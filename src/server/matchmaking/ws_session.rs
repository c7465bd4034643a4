/// WebSocket session handler for one game client.
///
/// This actor owns a single connection: it registers with the matchmaking
/// server when the socket opens, decodes client frames and forwards them,
/// and serializes server events back to the client. Undecodable or excess
/// frames are dropped without a reply. Clients that stop answering pings are
/// disconnected like a closed socket.
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, error, info};

use super::messages::{ClientEvent, ServerEvent};
use super::server::{ClientMessage, Connect, Disconnect, MatchServer};
use super::types::ConnectionId;
use crate::config::matchmaking::{CLIENT_TIMEOUT_SECS, HEARTBEAT_INTERVAL_SECS};
use crate::server::anti_spam::AntiSpamState;

/// Represents a player's WebSocket connection.
pub struct WsSession {
    pub id: ConnectionId,
    pub server: Addr<MatchServer>,
    anti_spam: AntiSpamState,
    // Last pong, ping or text frame from the client
    last_heartbeat: Instant,
}

impl WsSession {
    pub fn new(server: Addr<MatchServer>) -> Self {
        Self {
            id: ConnectionId::new(),
            server,
            anti_spam: AntiSpamState::new(),
            last_heartbeat: Instant::now(),
        }
    }

    /// Turn a text frame into a message for the matchmaking server.
    ///
    /// Any frame counts as a heartbeat, even one dropped by the flood guard.
    fn inbound(&mut self, text: &str, now: Instant) -> Option<ClientMessage> {
        self.last_heartbeat = now;
        if !self.anti_spam.record_frame(self.id) {
            return None;
        }
        match ClientEvent::decode(text) {
            Ok(event) => Some(ClientMessage { id: self.id, event }),
            Err(e) => {
                debug!("[WsSession] Dropped frame from {}: {}", self.id, e);
                None
            }
        }
    }

    fn outbound(&self, event: &ServerEvent) -> Option<String> {
        match event.encode() {
            Ok(text) => Some(text),
            Err(e) => {
                error!("[WsSession] Failed to serialize event for {}: {}", self.id, e);
                None
            }
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_heartbeat) > Duration::from_secs(CLIENT_TIMEOUT_SECS)
    }

    /// Ping the client periodically and stop the session once it went silent.
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS), |act, ctx| {
            if act.is_stale(Instant::now()) {
                info!("[WsSession] Client {} timed out, disconnecting", act.id);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    /// Called when the session starts. Registers the connection with the matchmaking server.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);
        self.server.do_send(Connect {
            id: self.id,
            addr: ctx.address().recipient(),
        });
    }

    /// Called when the session stops. Tears down everything the connection owned.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    /// Handles incoming WebSocket messages from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                if let Some(msg) = self.inbound(&text, Instant::now()) {
                    self.server.do_send(msg);
                }
            }
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => self.last_heartbeat = Instant::now(),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => (),
            Err(e) => {
                debug!("[WsSession] Protocol error on {}: {}", self.id, e);
                ctx.stop();
            }
        }
    }
}

impl Handler<ServerEvent> for WsSession {
    type Result = ();

    /// Handles messages sent from the server to this session.
    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        if let Some(text) = self.outbound(&msg) {
            ctx.text(text);
        }
    }
}

/// WebSocket endpoint for game clients.
///
/// Every upgrade gets a fresh connection id; no query parameters are needed.
pub async fn ws_matchmaking(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(WsSession::new(data.match_server.clone()), &req, stream)
}
