//! Two-level tic-tac-toe rule engine.
//!
//! Pure and deterministic: no I/O, no clocks, no concurrency. The
//! coordination layer above owns *who* may move; this crate only answers
//! *whether* a move is legal and what it does to the board.
//!
//! # Key types
//!
//! - [`Mark`] — the two players, `X` and `O`
//! - [`Outcome`] — result of a mini-board or the whole game (`X`/`O`/draw)
//! - [`Game`] — the nine-by-nine super-board state machine
//! - [`Snapshot`] — the serializable view sent to clients

mod board;
mod game;

pub use board::{Cells, Mark, Outcome, WIN_LINES, outcome_of};
pub use game::{Game, Snapshot};
