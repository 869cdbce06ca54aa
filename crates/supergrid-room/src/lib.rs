//! Room and session coordination for supergrid.
//!
//! This is the core of the server: the in-memory registry of concurrent
//! game rooms, the seat manager that assigns and reclaims the two player
//! seats across reconnects, and the coordinator that drives every inbound
//! action to completion — mutation plus broadcast — before the next one
//! runs.
//!
//! # Key types
//!
//! - [`CoordinatorHandle`] / [`spawn_coordinator`] — the single entry
//!   point; one command per client action
//! - [`Room`] — one game's state: engine, seats, live bindings, votes, chat
//! - [`RoomRegistry`] — code-keyed room map with collision-checked codes
//! - [`SeatDecision`] — the seat manager's verdict for a join request
//! - [`broadcast`] — pure projections from room state to outbound events
//!
//! # Concurrency model
//!
//! The coordinator is a single-writer actor owning every room and the
//! process-wide active-play set. Commands arrive on one channel and are
//! handled strictly one at a time, which is the entire mutual-exclusion
//! story: exactly one mutation is visible between broadcasts, and the
//! cross-room active-play set is read-modify-written under the same
//! serialization as room state.

pub mod broadcast;
mod coordinator;
mod error;
mod registry;
mod room;
mod seats;

pub use coordinator::{CoordinatorHandle, EventSender, spawn_coordinator};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{PlayerBinding, Room, SeatAssignment, SeatHolder, SpectatorBinding};
pub use seats::{ActiveSet, SeatDecision, decide, release_seats, reserve_seats};
