//! The match-history boundary.
//!
//! One record per concluded game between two registered accounts; guests
//! never appear here. The coordinator calls [`MatchWriter::record`]
//! *before* releasing the seats, so an implementation that returns after
//! durably queueing the record can never attribute a result to a reused
//! seat.

use std::sync::{Mutex, PoisonError};

use supergrid_protocol::AccountId;

/// One concluded match. A draw carries neither winner nor loser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub winner: Option<AccountId>,
    pub loser: Option<AccountId>,
    pub draw: bool,
}

/// Sink for concluded matches.
///
/// `record` must not return before the record is persisted or durably
/// queued; the caller frees the seats immediately afterwards.
pub trait MatchWriter: Send + Sync + 'static {
    fn record(&self, record: MatchRecord);
}

/// In-process match log for tests and the demo binary. Not durable.
#[derive(Debug, Default)]
pub struct MemoryMatchLog {
    records: Mutex<Vec<MatchRecord>>,
}

impl MemoryMatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn records(&self) -> Vec<MatchRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MatchWriter for MemoryMatchLog {
    fn record(&self, record: MatchRecord) {
        tracing::info!(
            winner = record.winner.as_ref().map(AccountId::as_str),
            loser = record.loser.as_ref().map(AccountId::as_str),
            draw = record.draw,
            "match recorded"
        );
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}
