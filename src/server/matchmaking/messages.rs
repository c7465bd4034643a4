//! Wire protocol between game clients and the server.
//!
//! Every WebSocket text frame is a JSON envelope `{"event": <name>, "data": <payload>}`.
//! Inbound payloads are decoded leniently: missing or mistyped fields fall back
//! to their default so a malformed gameplay frame is never fatal.

use std::collections::BTreeMap;

use actix::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::types::{ConnectionId, SessionId};

/// Reasons for an inbound frame to be dropped before reaching the lobby.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// `chute` payload. Force and direction are relayed untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct KickPayload {
    #[serde(rename = "forca")]
    pub force: Option<Value>,
    #[serde(rename = "direcao")]
    pub direction: Option<Value>,
}

/// `gol` payload. `time` is the team/side tag chosen by the client.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct GoalPayload {
    #[serde(rename = "time")]
    pub team: Option<Value>,
}

/// `bola_posse` payload.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct PossessionPayload {
    #[serde(rename = "comPosse")]
    pub has_possession: bool,
}

/// Message client -> serveur
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    JoinQueue,
    LeaveQueue,
    Ready,
    Movement(Value),
    Kick(KickPayload),
    Goal(GoalPayload),
    Possession(PossessionPayload),
}

impl ClientEvent {
    /// Decode a text frame into a client event.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let event = match envelope.event.as_str() {
            "entrar_fila" => Self::JoinQueue,
            "sair_fila" => Self::LeaveQueue,
            "pronto_para_jogar" => Self::Ready,
            "movimento" => Self::Movement(envelope.data),
            "chute" => Self::Kick(lenient(envelope.data)),
            "gol" => Self::Goal(lenient(envelope.data)),
            "bola_posse" => Self::Possession(lenient(envelope.data)),
            _ => return Err(ProtocolError::UnknownEvent(envelope.event)),
        };
        Ok(event)
    }

    /// Event name as it appears on the wire, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinQueue => "entrar_fila",
            Self::LeaveQueue => "sair_fila",
            Self::Ready => "pronto_para_jogar",
            Self::Movement(_) => "movimento",
            Self::Kick(_) => "chute",
            Self::Goal(_) => "gol",
            Self::Possession(_) => "bola_posse",
        }
    }
}

fn lenient<T: for<'de> Deserialize<'de> + Default>(data: Value) -> T {
    serde_json::from_value(data).unwrap_or_default()
}

/// Aggregate counters broadcast as `jogadores_online`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Registered connections.
    pub total: usize,
    /// Connections waiting in the queue.
    #[serde(rename = "naFila")]
    pub queued: usize,
    /// Live match sessions.
    #[serde(rename = "partidasAtivas")]
    pub active_sessions: usize,
}

/// Why a session was torn down.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TeardownReason {
    OpponentDisconnected,
    Expired,
    Finished,
}

pub type Scoreboard = BTreeMap<ConnectionId, u32>;

// Message serveur -> client
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "conectado")]
    Connected {
        #[serde(rename = "seuId")]
        your_id: ConnectionId,
        #[serde(rename = "totalJogadores")]
        total_players: usize,
        #[serde(rename = "mensagem")]
        message: String,
    },
    #[serde(rename = "jogadores_online")]
    PlayersOnline(Stats),
    #[serde(rename = "entrou_fila")]
    JoinedQueue {
        #[serde(rename = "posicao")]
        position: usize,
    },
    #[serde(rename = "saiu_fila")]
    LeftQueue,
    #[serde(rename = "partida_encontrada")]
    MatchFound {
        #[serde(rename = "salaId")]
        session_id: SessionId,
        #[serde(rename = "oponenteId")]
        opponent_id: ConnectionId,
        #[serde(rename = "souJogador1")]
        is_player_one: bool,
    },
    #[serde(rename = "oponente_pronto")]
    OpponentReady {
        #[serde(rename = "jogadorId")]
        player_id: ConnectionId,
    },
    #[serde(rename = "movimento_oponente")]
    OpponentMoved {
        #[serde(rename = "jogadorId")]
        player_id: ConnectionId,
        #[serde(rename = "posicao")]
        position: Value,
    },
    #[serde(rename = "chute_oponente")]
    OpponentKicked {
        #[serde(rename = "jogadorId")]
        player_id: ConnectionId,
        #[serde(rename = "forca")]
        force: Option<Value>,
        #[serde(rename = "direcao")]
        direction: Option<Value>,
    },
    #[serde(rename = "gol_marcado")]
    GoalScored {
        #[serde(rename = "jogadorId")]
        player_id: ConnectionId,
        #[serde(rename = "time")]
        team: Option<Value>,
        #[serde(rename = "placar")]
        score: Scoreboard,
    },
    #[serde(rename = "bola_posse_oponente")]
    OpponentPossession {
        #[serde(rename = "jogadorId")]
        player_id: ConnectionId,
        #[serde(rename = "comPosse")]
        has_possession: bool,
    },
    #[serde(rename = "oponente_desconectou")]
    OpponentDisconnected {
        #[serde(rename = "salaId")]
        session_id: SessionId,
        #[serde(rename = "motivo")]
        reason: TeardownReason,
    },
    #[serde(rename = "jogador_saiu")]
    PlayerLeft {
        #[serde(rename = "jogadorId")]
        player_id: ConnectionId,
    },
    #[serde(rename = "partida_encerrada")]
    MatchFinished {
        #[serde(rename = "salaId")]
        session_id: SessionId,
        #[serde(rename = "vencedorId")]
        winner_id: ConnectionId,
        #[serde(rename = "placar")]
        score: Scoreboard,
    },
}

impl ServerEvent {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
