//! One room's state: engine, seats, live bindings, votes, chat.

use std::collections::{HashMap, HashSet};

use supergrid_engine::{Game, Mark};
use supergrid_protocol::{AccountId, ChatEntry, ConnectionId, RoomCode};

/// An account holding a seat. Holders survive disconnects: the identity
/// stays even when no live connection is bound to the seat, which is what
/// makes reconnect-by-identity work.
#[derive(Debug, Clone)]
pub struct SeatHolder {
    pub account: AccountId,
    pub name: String,
    pub guest: bool,
}

/// The room's two seats, X and O. Append-only between rematch resets:
/// a seat, once assigned, keeps its holder until the room is reset.
#[derive(Debug, Default)]
pub struct SeatAssignment {
    x: Option<SeatHolder>,
    o: Option<SeatHolder>,
}

impl SeatAssignment {
    pub fn holder(&self, mark: Mark) -> Option<&SeatHolder> {
        match mark {
            Mark::X => self.x.as_ref(),
            Mark::O => self.o.as_ref(),
        }
    }

    /// Which seat, if any, the account holds.
    pub fn seat_of(&self, account: &AccountId) -> Option<Mark> {
        if self.x.as_ref().is_some_and(|h| &h.account == account) {
            return Some(Mark::X);
        }
        if self.o.as_ref().is_some_and(|h| &h.account == account) {
            return Some(Mark::O);
        }
        None
    }

    pub fn count(&self) -> usize {
        usize::from(self.x.is_some()) + usize::from(self.o.is_some())
    }

    pub fn is_full(&self) -> bool {
        self.x.is_some() && self.o.is_some()
    }

    /// Assigns the next free seat: X first, then O. Callers check
    /// [`is_full`](Self::is_full) beforehand.
    pub fn assign(&mut self, holder: SeatHolder) -> Mark {
        if self.x.is_none() {
            self.x = Some(holder);
            Mark::X
        } else {
            debug_assert!(self.o.is_none(), "assign called on a full room");
            self.o = Some(holder);
            Mark::O
        }
    }

    pub fn holders(&self) -> impl Iterator<Item = (Mark, &SeatHolder)> {
        self.x
            .iter()
            .map(|h| (Mark::X, h))
            .chain(self.o.iter().map(|h| (Mark::O, h)))
    }
}

/// Live binding of one seated connection.
#[derive(Debug, Clone)]
pub struct PlayerBinding {
    pub account: AccountId,
    pub name: String,
    pub mark: Mark,
}

/// Live binding of one spectating connection.
#[derive(Debug, Clone)]
pub struct SpectatorBinding {
    pub account: AccountId,
    pub name: String,
}

/// One game room. Created on an explicit `create`; never evicted.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    pub game: Game,
    pub seats: SeatAssignment,
    /// Seated connections only. A seat with no entry here belongs to a
    /// disconnected holder awaiting reconnect.
    pub players: HashMap<ConnectionId, PlayerBinding>,
    pub spectators: HashMap<ConnectionId, SpectatorBinding>,
    /// Seated connections that voted to start.
    pub ready: HashSet<ConnectionId>,
    /// Seated connections that voted for a rematch.
    pub rematch: HashSet<ConnectionId>,
    /// Append-only chat log, replayed to every joiner.
    pub chat: Vec<ChatEntry>,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            game: Game::new(),
            seats: SeatAssignment::default(),
            players: HashMap::new(),
            spectators: HashMap::new(),
            ready: HashSet::new(),
            rematch: HashSet::new(),
            chat: Vec::new(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// The live connection currently bound to the account's seat, if any.
    pub fn connection_of(&self, account: &AccountId) -> Option<ConnectionId> {
        self.players
            .iter()
            .find(|(_, binding)| &binding.account == account)
            .map(|(conn, _)| *conn)
    }

    /// Whether the connection is in this room, seated or spectating.
    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.players.contains_key(&conn) || self.spectators.contains_key(&conn)
    }

    /// Both seats assigned and both carrying a live ready vote.
    pub fn both_ready(&self) -> bool {
        self.seats.is_full() && self.ready.len() == 2
    }

    /// Both seats assigned and both carrying a live rematch vote.
    pub fn both_rematch(&self) -> bool {
        self.seats.is_full() && self.rematch.len() == 2
    }

    /// Swaps in a fresh unstarted engine for an agreed rematch. Seats,
    /// live bindings, spectators and chat survive; votes do not.
    pub fn reset_for_rematch(&mut self) {
        self.game = Game::new();
        self.ready.clear();
        self.rematch.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder(id: &str) -> SeatHolder {
        SeatHolder {
            account: AccountId(id.to_string()),
            name: id.to_string(),
            guest: false,
        }
    }

    fn room() -> Room {
        Room::new(RoomCode::parse("abcde").unwrap())
    }

    #[test]
    fn test_seat_assignment_x_then_o() {
        let mut seats = SeatAssignment::default();
        assert_eq!(seats.assign(holder("a")), Mark::X);
        assert_eq!(seats.assign(holder("b")), Mark::O);
        assert!(seats.is_full());
        assert_eq!(seats.count(), 2);
    }

    #[test]
    fn test_seat_of_finds_either_seat() {
        let mut seats = SeatAssignment::default();
        seats.assign(holder("a"));
        seats.assign(holder("b"));

        assert_eq!(seats.seat_of(&AccountId("a".into())), Some(Mark::X));
        assert_eq!(seats.seat_of(&AccountId("b".into())), Some(Mark::O));
        assert_eq!(seats.seat_of(&AccountId("c".into())), None);
    }

    #[test]
    fn test_reset_for_rematch_keeps_seats_and_chat() {
        let mut room = room();
        room.seats.assign(holder("a"));
        room.seats.assign(holder("b"));
        room.chat.push(ChatEntry {
            author: "a".into(),
            text: "gg".into(),
            spectator: false,
        });
        room.ready.insert(ConnectionId(1));
        room.rematch.insert(ConnectionId(1));
        room.game.start();

        room.reset_for_rematch();

        assert!(room.seats.is_full());
        assert_eq!(room.chat.len(), 1);
        assert!(room.ready.is_empty());
        assert!(room.rematch.is_empty());
        assert!(!room.game.started());
    }

    #[test]
    fn test_both_ready_requires_full_seats() {
        let mut room = room();
        room.ready.insert(ConnectionId(1));
        room.ready.insert(ConnectionId(2));
        assert!(!room.both_ready(), "votes without seats must not start a game");

        room.seats.assign(holder("a"));
        room.seats.assign(holder("b"));
        assert!(room.both_ready());
    }
}
