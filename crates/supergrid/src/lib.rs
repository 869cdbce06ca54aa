//! # supergrid
//!
//! Real-time multiplayer Ultimate Tic-Tac-Toe backend: a websocket server
//! over a single-writer room/session coordinator.
//!
//! Plug in an [`Authenticator`](supergrid_session::Authenticator) for the
//! account boundary and a [`MatchWriter`](supergrid_session::MatchWriter)
//! for history persistence, then run:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use supergrid::prelude::*;
//!
//! struct GuestsOnly;
//!
//! impl Authenticator for GuestsOnly {
//!     async fn authenticate(&self, token: &str) -> Result<Party, AuthError> {
//!         Ok(issue_guest(token))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = ServerBuilder::new()
//!         .bind("0.0.0.0:8080")
//!         .build(GuestsOnly, Arc::new(MemoryMatchLog::new()))
//!         .await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{Server, ServerBuilder};

/// One-stop imports for server binaries and tests.
pub mod prelude {
    pub use crate::{Server, ServerBuilder, ServerError};
    pub use supergrid_engine::{Game, Mark, Outcome, Snapshot};
    pub use supergrid_protocol::{
        AccountId, ChatEntry, ClientEvent, Codec, ConnectionId, JsonCodec, RoomCode, ServerEvent,
    };
    pub use supergrid_room::CoordinatorHandle;
    pub use supergrid_session::{
        AuthError, Authenticator, MatchRecord, MatchWriter, MemoryMatchLog, Party, issue_guest,
    };
}
