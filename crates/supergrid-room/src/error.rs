//! Error types for the coordination layer.
//!
//! Client-visible failures (`invalid`, `already_in_game`, silently
//! absorbed illegal actions) travel as [`ServerEvent`]s, not errors —
//! nothing a client does is fatal. This type covers the one thing that
//! is: the coordinator itself being gone.
//!
//! [`ServerEvent`]: supergrid_protocol::ServerEvent

/// Errors that can occur when submitting a command to the coordinator.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The coordinator's command channel is closed; the process is
    /// shutting down.
    #[error("coordinator unavailable")]
    Unavailable,
}
