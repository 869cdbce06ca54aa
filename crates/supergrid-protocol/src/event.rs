//! The events of the real-time channel.
//!
//! Internally tagged (`{"type": "...", ...}`) so the client can dispatch
//! on one field. Variant names are renamed to the exact strings the
//! browser script listens for — changing one is a protocol break.

use serde::{Deserialize, Serialize};
use supergrid_engine::{Mark, Snapshot};

use crate::{AccountId, ChatEntry, RoomCode};

/// Everything a client may send. Disconnect has no event — it is the
/// socket closing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Handshake: must be the first event on a fresh connection. The
    /// token is opaque to this layer; the authenticator resolves it.
    Hello { token: String },
    /// Open a new room. The reply is [`ServerEvent::Created`].
    Create,
    Join {
        room: RoomCode,
    },
    Ready {
        room: RoomCode,
    },
    Move {
        room: RoomCode,
        board: usize,
        cell: usize,
    },
    /// `symbol` is what the client believes it holds; the server trusts
    /// its own seat binding instead.
    Resign {
        room: RoomCode,
        symbol: Mark,
    },
    Rematch {
        room: RoomCode,
    },
    Chat {
        room: RoomCode,
        message: String,
    },
}

/// Everything the server may emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Handshake ack: the resolved identity for this connection.
    Welcome {
        account: AccountId,
        name: String,
        guest: bool,
    },
    Created {
        room: RoomCode,
    },
    /// The referenced room does not exist.
    Invalid,
    /// The account already holds a seat in another active game.
    #[serde(rename = "already_in_game")]
    AlreadyInGame {
        error: String,
    },
    /// The joiner holds (or reclaimed) this seat.
    Assign {
        symbol: Mark,
    },
    /// The joiner was admitted without a seat.
    Spectator,
    /// Full game snapshot, flattened so the board fields sit at the top
    /// level of the payload.
    State {
        #[serde(flatten)]
        snapshot: Snapshot,
    },
    GameStatus {
        player_count: usize,
        ready_players: Vec<String>,
        rematch_players: Vec<String>,
    },
    SpectatorList {
        spectators: Vec<String>,
    },
    /// Buffered chat log, delivered to a joining connection only.
    ChatHistory {
        history: Vec<ChatEntry>,
    },
    ChatMessage {
        entry: ChatEntry,
    },
    /// Both seats voted for a rematch; the board is fresh and clients
    /// should re-issue ready votes.
    RematchAgreed,
}
