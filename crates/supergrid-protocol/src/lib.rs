//! Wire protocol for supergrid.
//!
//! Everything the client and server say to each other lives here:
//!
//! - **Identity** ([`AccountId`], [`ConnectionId`], [`RoomCode`]) — who is
//!   talking and about which room.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the named messages of
//!   the real-time channel.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how events become bytes.
//!
//! The protocol layer knows nothing about rooms or sockets; it only
//! defines shapes. The event names and payload fields are load-bearing —
//! the browser client dispatches on them verbatim.

mod codec;
mod error;
mod event;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{ClientEvent, ServerEvent};
pub use types::{AccountId, ChatEntry, ConnectionId, ROOM_CODE_LEN, RoomCode};
