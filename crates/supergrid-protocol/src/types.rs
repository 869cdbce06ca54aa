//! Identity types and small wire structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Opaque, stable identity of one party: a registered user id or a guest
/// id. Unique per party and constant across reconnects for the lifetime of
/// their session cookie; minted and owned outside this process.
///
/// `#[serde(transparent)]` keeps it a plain string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Transient identifier for one live transport connection. Many
/// connections may serve the same [`AccountId`] over time — a reconnect
/// is a new `ConnectionId` for the same account. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 5;

/// A room's shareable identifier: five lowercase ASCII letters.
///
/// Deserialization is shape-lenient (a malformed code simply never matches
/// a registry entry); [`RoomCode::parse`] is the strict constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Validates shape: exactly [`ROOM_CODE_LEN`] lowercase ASCII letters.
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        if value.len() == ROOM_CODE_LEN && value.bytes().all(|b| b.is_ascii_lowercase()) {
            Ok(Self(value.to_string()))
        } else {
            Err(ProtocolError::InvalidMessage(format!(
                "malformed room code: {value:?}"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry of a room's append-only chat log, as relayed to every member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Display name of the sender.
    pub author: String,
    pub text: String,
    /// Whether the sender was spectating (not seated) when they wrote it.
    pub spectator: bool,
}
