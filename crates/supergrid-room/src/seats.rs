//! Seat arbitration: one account, one active game.

use std::collections::HashSet;

use supergrid_engine::Mark;
use supergrid_protocol::AccountId;
use supergrid_session::Party;

use crate::{Room, SeatHolder};

/// Accounts currently holding a seat in any room, across both namespaces.
/// Read-modify-written only from inside the coordinator task, which is
/// what keeps it consistent with room state.
#[derive(Debug, Default)]
pub struct ActiveSet(HashSet<AccountId>);

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.0.contains(account)
    }

    pub fn insert(&mut self, account: AccountId) -> bool {
        self.0.insert(account)
    }

    pub fn remove(&mut self, account: &AccountId) -> bool {
        self.0.remove(account)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The seat manager's verdict for one (room, party) join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatDecision {
    /// The account already holds a seat here; rebind it to the new
    /// connection and re-emit its symbol.
    Reconnect(Mark),
    /// A fresh seat was assigned and the account reserved.
    Seated(Mark),
    /// Both seats taken; admitted without a seat.
    Spectator,
    /// The account is seated in another room and a seat would have been
    /// assigned here. Nothing was mutated.
    Rejected,
}

/// Decides what a join means, in order: reconnect beats everything, a
/// full room admits spectators (even parties active elsewhere — watching
/// consumes nothing), and only then does the one-active-game rule gate a
/// fresh seat.
pub fn decide(room: &mut Room, active: &mut ActiveSet, party: &Party) -> SeatDecision {
    if let Some(mark) = room.seats.seat_of(&party.account) {
        return SeatDecision::Reconnect(mark);
    }
    if room.seats.is_full() {
        return SeatDecision::Spectator;
    }
    if active.contains(&party.account) {
        return SeatDecision::Rejected;
    }
    let mark = room.seats.assign(SeatHolder {
        account: party.account.clone(),
        name: party.name.clone(),
        guest: party.guest,
    });
    active.insert(party.account.clone());
    SeatDecision::Seated(mark)
}

/// Frees every seated account for play elsewhere. The seat assignment
/// itself persists so a rematch can reuse it.
pub fn release_seats(room: &Room, active: &mut ActiveSet) {
    for (_, holder) in room.seats.holders() {
        active.remove(&holder.account);
    }
}

/// Re-reserves every seated account, used when an agreed rematch puts the
/// same seats back into active play.
pub fn reserve_seats(room: &Room, active: &mut ActiveSet) {
    for (_, holder) in room.seats.holders() {
        active.insert(holder.account.clone());
    }
}
