/// Matchmaking server actor.
///
/// Owns the [`Lobby`] and the outbound address of every connected socket.
/// The actor mailbox serializes connection events and reaper ticks, so the
/// lobby never sees two operations interleave. Outgoing messages are pushed
/// to the socket actors with `do_send` and never awaited.

use actix::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use log::{debug, info};

use super::lobby::Lobby;
use super::messages::{ClientEvent, ServerEvent, Stats};
use super::outbox::{Delivery, Outbox};
use super::types::ConnectionId;
use crate::config::server::{MatchRules, ReaperConfig};

/// Main matchmaking server actor.
pub struct MatchServer {
    lobby: Lobby,
    /// Outbound channel of every connected socket.
    sockets: HashMap<ConnectionId, Recipient<ServerEvent>>,
    reaper: ReaperConfig,
    reaper_handle: Option<SpawnHandle>,
}

impl MatchServer {
    /// Create a new matchmaking server.
    pub fn new(rules: MatchRules, reaper: ReaperConfig) -> Self {
        Self {
            lobby: Lobby::new(rules),
            sockets: HashMap::new(),
            reaper,
            reaper_handle: None,
        }
    }

    /// Deliver everything recorded in the outbox.
    fn flush(&self, outbox: &mut Outbox) {
        for delivery in outbox.drain() {
            match delivery {
                Delivery::To(id, event) => {
                    if let Some(socket) = self.sockets.get(&id) {
                        socket.do_send(event);
                    }
                }
                Delivery::Broadcast(event) => {
                    for socket in self.sockets.values() {
                        socket.do_send(event.clone());
                    }
                }
            }
        }
    }

    fn reap(&mut self, now: Instant) {
        let mut outbox = Outbox::new();
        let destroyed = self.lobby.reap(now, self.reaper.max_age, &mut outbox);
        if destroyed == 0 {
            debug!("[Reaper] Sweep found nothing to reclaim ({} active)", self.lobby.sessions().len());
        }
        self.flush(&mut outbox);
    }
}

/// Message: a socket opened.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: ConnectionId,
    pub addr: Recipient<ServerEvent>,
}

/// Message: a socket closed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: ConnectionId,
}

/// Message: a decoded gameplay or queue event from a socket.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientMessage {
    pub id: ConnectionId,
    pub event: ClientEvent,
}

/// Message: read the aggregate counters.
#[derive(Message)]
#[rtype(result = "Stats")]
pub struct GetStats;

impl Actor for MatchServer {
    type Context = Context<Self>;

    /// Schedules the session reaper for the lifetime of the actor.
    fn started(&mut self, ctx: &mut Self::Context) {
        let handle = ctx.run_interval(self.reaper.interval, |act, _ctx| {
            act.reap(Instant::now());
        });
        self.reaper_handle = Some(handle);
        info!(
            "[Reaper] Sweeping every {:?}, sessions expire after {:?}",
            self.reaper.interval, self.reaper.max_age
        );
    }

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        if let Some(handle) = self.reaper_handle.take() {
            ctx.cancel_future(handle);
        }
        Running::Stop
    }
}

impl Handler<Connect> for MatchServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        self.sockets.insert(msg.id, msg.addr);
        let mut outbox = Outbox::new();
        self.lobby.connect(msg.id, &mut outbox);
        self.flush(&mut outbox);
    }
}

impl Handler<Disconnect> for MatchServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        // Detach first so the leaving socket gets none of the teardown broadcasts.
        self.sockets.remove(&msg.id);
        let mut outbox = Outbox::new();
        self.lobby.disconnect(msg.id, &mut outbox);
        self.flush(&mut outbox);
    }
}

impl Handler<ClientMessage> for MatchServer {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, _ctx: &mut Self::Context) -> Self::Result {
        let mut outbox = Outbox::new();
        self.lobby.handle(msg.id, msg.event, &mut outbox);
        self.flush(&mut outbox);
    }
}

impl Handler<GetStats> for MatchServer {
    type Result = MessageResult<GetStats>;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.lobby.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Stand-in for a WebSocket session: records every event it receives.
    struct Probe {
        received: Arc<Mutex<Vec<ServerEvent>>>,
    }

    impl Actor for Probe {
        type Context = Context<Self>;
    }

    impl Handler<ServerEvent> for Probe {
        type Result = ();

        fn handle(&mut self, msg: ServerEvent, _ctx: &mut Self::Context) -> Self::Result {
            self.received.lock().unwrap().push(msg);
        }
    }

    fn probe() -> (Recipient<ServerEvent>, Arc<Mutex<Vec<ServerEvent>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let addr = Probe { received: received.clone() }.start();
        (addr.recipient(), received)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[actix::test]
    async fn test_pairing_reaches_both_sockets() {
        let server = MatchServer::new(MatchRules::default(), ReaperConfig::default()).start();
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let (addr_a, inbox_a) = probe();
        let (addr_b, inbox_b) = probe();
        server.do_send(Connect { id: a, addr: addr_a });
        server.do_send(Connect { id: b, addr: addr_b });
        server.do_send(ClientMessage { id: a, event: ClientEvent::JoinQueue });
        server.do_send(ClientMessage { id: b, event: ClientEvent::JoinQueue });

        let stats = server.send(GetStats).await.unwrap();
        assert_eq!(stats, Stats { total: 2, queued: 0, active_sessions: 1 });
        settle().await;

        let found = |inbox: &Arc<Mutex<Vec<ServerEvent>>>| {
            inbox
                .lock()
                .unwrap()
                .iter()
                .find_map(|e| match e {
                    ServerEvent::MatchFound { session_id, is_player_one, .. } => Some((session_id.clone(), *is_player_one)),
                    _ => None,
                })
                .unwrap()
        };
        let (sid_a, one_a) = found(&inbox_a);
        let (sid_b, one_b) = found(&inbox_b);
        assert_eq!(sid_a, sid_b);
        assert!(one_a && !one_b);
    }

    #[actix::test]
    async fn test_disconnected_socket_gets_no_broadcasts() {
        let server = MatchServer::new(MatchRules::default(), ReaperConfig::default()).start();
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let (addr_a, inbox_a) = probe();
        let (addr_b, inbox_b) = probe();
        server.do_send(Connect { id: a, addr: addr_a });
        server.do_send(Connect { id: b, addr: addr_b });
        server.send(GetStats).await.unwrap();
        settle().await;
        let seen_by_a = inbox_a.lock().unwrap().len();

        server.do_send(Disconnect { id: a });
        let stats = server.send(GetStats).await.unwrap();
        assert_eq!(stats.total, 1);
        settle().await;

        assert_eq!(inbox_a.lock().unwrap().len(), seen_by_a);
        assert!(inbox_b
            .lock()
            .unwrap()
            .contains(&ServerEvent::PlayerLeft { player_id: a }));
    }

    #[actix::test]
    async fn test_reaper_timer_expires_sessions() {
        let reaper = ReaperConfig {
            interval: Duration::from_millis(20),
            max_age: Duration::from_millis(0),
        };
        let server = MatchServer::new(MatchRules::default(), reaper).start();
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let (addr_a, inbox_a) = probe();
        let (addr_b, _inbox_b) = probe();
        server.do_send(Connect { id: a, addr: addr_a });
        server.do_send(Connect { id: b, addr: addr_b });
        server.do_send(ClientMessage { id: a, event: ClientEvent::JoinQueue });
        server.do_send(ClientMessage { id: b, event: ClientEvent::JoinQueue });

        tokio::time::sleep(Duration::from_millis(120)).await;

        let stats = server.send(GetStats).await.unwrap();
        assert_eq!(stats.active_sessions, 0);
        assert!(inbox_a.lock().unwrap().iter().any(|e| matches!(
            e,
            ServerEvent::OpponentDisconnected { reason: super::super::messages::TeardownReason::Expired, .. }
        )));
    }
}
