//! Pure projections from room state to outbound events.
//!
//! Derivation only — nothing here mutates a room or touches a channel.
//! The coordinator calls these after every mutating action and delivers
//! the results itself.

use std::collections::HashSet;

use supergrid_protocol::{ConnectionId, ServerEvent};

use crate::Room;

/// Full game snapshot.
pub fn game_state(room: &Room) -> ServerEvent {
    ServerEvent::State {
        snapshot: room.game.snapshot(),
    }
}

/// Seat count plus the seated display names partitioned into ready and
/// rematch-ready lists. Names are sorted so payloads are deterministic.
pub fn game_status(room: &Room) -> ServerEvent {
    ServerEvent::GameStatus {
        player_count: room.seats.count(),
        ready_players: seated_names(room, &room.ready),
        rematch_players: seated_names(room, &room.rematch),
    }
}

/// Display names of everyone watching.
pub fn spectator_list(room: &Room) -> ServerEvent {
    let mut spectators: Vec<String> = room.spectators.values().map(|s| s.name.clone()).collect();
    spectators.sort();
    ServerEvent::SpectatorList { spectators }
}

/// The room's buffered chat, for a joining connection.
pub fn chat_history(room: &Room) -> ServerEvent {
    ServerEvent::ChatHistory {
        history: room.chat.clone(),
    }
}

fn seated_names(room: &Room, votes: &HashSet<ConnectionId>) -> Vec<String> {
    let mut names: Vec<String> = votes
        .iter()
        .filter_map(|conn| room.players.get(conn))
        .map(|binding| binding.name.clone())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use supergrid_engine::Mark;
    use supergrid_protocol::{AccountId, RoomCode};

    use super::*;
    use crate::{PlayerBinding, SeatHolder, SpectatorBinding};

    fn room_with_players() -> Room {
        let mut room = Room::new(RoomCode::parse("abcde").unwrap());
        for (idx, name) in ["alice", "bob"].iter().enumerate() {
            let account = AccountId(format!("user-{name}"));
            room.seats.assign(SeatHolder {
                account: account.clone(),
                name: name.to_string(),
                guest: false,
            });
            room.players.insert(
                ConnectionId(idx as u64 + 1),
                PlayerBinding {
                    account,
                    name: name.to_string(),
                    mark: if idx == 0 { Mark::X } else { Mark::O },
                },
            );
        }
        room
    }

    #[test]
    fn test_game_status_partitions_votes() {
        let mut room = room_with_players();
        room.ready.insert(ConnectionId(1));
        room.rematch.insert(ConnectionId(2));

        let ServerEvent::GameStatus {
            player_count,
            ready_players,
            rematch_players,
        } = game_status(&room)
        else {
            panic!("expected gameStatus");
        };

        assert_eq!(player_count, 2);
        assert_eq!(ready_players, vec!["alice".to_string()]);
        assert_eq!(rematch_players, vec!["bob".to_string()]);
    }

    #[test]
    fn test_game_status_ignores_votes_without_binding() {
        let mut room = room_with_players();
        // A vote from a connection that has since dropped its binding.
        room.ready.insert(ConnectionId(99));

        let ServerEvent::GameStatus { ready_players, .. } = game_status(&room) else {
            panic!("expected gameStatus");
        };
        assert!(ready_players.is_empty());
    }

    #[test]
    fn test_spectator_list_is_sorted() {
        let mut room = room_with_players();
        for (idx, name) in ["zoe", "ann"].iter().enumerate() {
            room.spectators.insert(
                ConnectionId(10 + idx as u64),
                SpectatorBinding {
                    account: AccountId(format!("guest-{name}")),
                    name: name.to_string(),
                },
            );
        }

        let ServerEvent::SpectatorList { spectators } = spectator_list(&room) else {
            panic!("expected spectatorList");
        };
        assert_eq!(spectators, vec!["ann".to_string(), "zoe".to_string()]);
    }

    #[test]
    fn test_game_state_reflects_engine() {
        let mut room = room_with_players();
        room.game.start();

        let ServerEvent::State { snapshot } = game_state(&room) else {
            panic!("expected state");
        };
        assert!(snapshot.started);
        assert_eq!(snapshot.player, Mark::X);
    }
}
