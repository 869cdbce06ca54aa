//! Top-level server error type.

use supergrid_protocol::ProtocolError;
use supergrid_room::RoomError;
use supergrid_session::AuthError;

/// Errors surfaced by the server and its connection handlers.
///
/// None of these are fatal to the process — a failing connection logs and
/// dies alone; only `run()` itself propagates bind/accept problems.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or accepting a TCP connection failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The websocket layer failed mid-conversation.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The authenticator rejected the handshake token.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The coordinator is gone (process shutting down).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The connection broke protocol before it was attached.
    #[error("handshake failed: {0}")]
    Handshake(String),
}
