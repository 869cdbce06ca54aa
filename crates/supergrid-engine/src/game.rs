//! The super-board state machine.
//!
//! Nine mini-boards plus nine mini-outcomes, a current player, and the
//! forced-board constraint: each move sends the opponent to the mini-board
//! whose index matches the cell just played, unless that board is already
//! decided (then the opponent plays anywhere).
//!
//! Invariants: a cell, once set, never changes; a mini-outcome, once
//! decided, never changes; the game winner goes from `None` to a terminal
//! value exactly once.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::board::{Cells, Mark, Outcome, WIN_LINES, outcome_of};

/// Serializable view of a [`Game`], field names matching what the client
/// script renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub boards: [Cells; 9],
    pub winners: [Option<Outcome>; 9],
    pub player: Mark,
    pub forced: Option<usize>,
    #[serde(rename = "gameWinner")]
    pub game_winner: Option<Outcome>,
    pub started: bool,
}

/// One game of two-level tic-tac-toe.
///
/// State machine: not started → started → concluded. `concluded` is
/// terminal; no operation leaves it.
#[derive(Debug, Clone)]
pub struct Game {
    boards: [Cells; 9],
    winners: [Option<Outcome>; 9],
    current: Mark,
    forced: Option<usize>,
    winner: Option<Outcome>,
    started: bool,
}

impl Game {
    /// A fresh, unstarted game. `X` moves first once started.
    pub fn new() -> Self {
        Self {
            boards: [[None; 9]; 9],
            winners: [None; 9],
            current: Mark::X,
            forced: None,
            winner: None,
            started: false,
        }
    }

    /// Opens the game for moves. Called once both seats are ready.
    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn current(&self) -> Mark {
        self.current
    }

    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Plays the current player's mark at `cell` of mini-board `board`.
    ///
    /// Legal iff the game is started and undecided, the target mini-board
    /// is undecided, the board matches the forced board (or no board is
    /// forced), and the cell is empty. Returns `false` and mutates nothing
    /// on any illegality.
    pub fn apply_move(&mut self, board: usize, cell: usize) -> bool {
        if !self.started || self.winner.is_some() {
            return false;
        }
        if board >= 9 || cell >= 9 {
            return false;
        }
        if self.winners[board].is_some() {
            return false;
        }
        if self.forced.is_some_and(|forced| forced != board) {
            return false;
        }
        if self.boards[board][cell].is_some() {
            return false;
        }

        self.boards[board][cell] = Some(self.current);
        self.winners[board] = outcome_of(&self.boards[board]);
        self.winner = decide_game(&self.winners);

        // The opponent is sent to the board named by this cell, unless
        // that board is already decided.
        self.forced = if self.winners[cell].is_none() {
            Some(cell)
        } else {
            None
        };
        self.current = self.current.opponent();
        true
    }

    /// Forfeits the game for `loser`, unconditionally. Layering over an
    /// already-concluded game is the caller's responsibility.
    pub fn resign(&mut self, loser: Mark) {
        self.winner = Some(Outcome::from(loser.opponent()));
    }

    /// Pure read of the full state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            boards: self.boards,
            winners: self.winners,
            player: self.current,
            forced: self.forced,
            game_winner: self.winner,
            started: self.started,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides the whole game from the nine mini-outcomes.
///
/// A triple of one mark among the outcomes wins outright. Once all nine
/// boards are decided with no triple, the side with strictly more won
/// boards wins; equal counts are a draw.
fn decide_game(winners: &[Option<Outcome>; 9]) -> Option<Outcome> {
    for line in WIN_LINES {
        if let Some(mark) = winners[line[0]].and_then(Outcome::mark) {
            let outcome = Outcome::from(mark);
            if winners[line[1]] == Some(outcome) && winners[line[2]] == Some(outcome) {
                return Some(outcome);
            }
        }
    }
    if winners.iter().all(Option::is_some) {
        let x = winners.iter().filter(|w| **w == Some(Outcome::X)).count();
        let o = winners.iter().filter(|w| **w == Some(Outcome::O)).count();
        return Some(match x.cmp(&o) {
            Ordering::Greater => Outcome::X,
            Ordering::Less => Outcome::O,
            Ordering::Equal => Outcome::Draw,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_game() -> Game {
        let mut game = Game::new();
        game.start();
        game
    }

    const X: Option<Outcome> = Some(Outcome::X);
    const O: Option<Outcome> = Some(Outcome::O);
    const D: Option<Outcome> = Some(Outcome::Draw);

    // =====================================================================
    // apply_move legality
    // =====================================================================

    #[test]
    fn test_apply_move_before_start_fails() {
        let mut game = Game::new();
        assert!(!game.apply_move(0, 0));
        assert_eq!(game.snapshot().boards[0][0], None);
    }

    #[test]
    fn test_apply_move_places_mark_and_toggles_player() {
        let mut game = started_game();
        assert_eq!(game.current(), Mark::X);

        assert!(game.apply_move(0, 4));

        let snap = game.snapshot();
        assert_eq!(snap.boards[0][4], Some(Mark::X));
        assert_eq!(snap.player, Mark::O);
        assert_eq!(snap.forced, Some(4));
    }

    #[test]
    fn test_apply_move_occupied_cell_never_overwritten() {
        let mut game = started_game();
        assert!(game.apply_move(4, 4)); // X, opponent forced to board 4
        assert!(!game.apply_move(4, 4)); // O on the same cell

        let snap = game.snapshot();
        assert_eq!(snap.boards[4][4], Some(Mark::X), "cell must keep its first mark");
        assert_eq!(snap.player, Mark::O, "failed move must not toggle the player");
    }

    #[test]
    fn test_apply_move_outside_forced_board_fails() {
        let mut game = started_game();
        assert!(game.apply_move(0, 4)); // forces board 4

        assert!(!game.apply_move(5, 0), "move must land in the forced board");
        assert!(game.apply_move(4, 0));
    }

    #[test]
    fn test_apply_move_out_of_range_fails() {
        let mut game = started_game();
        assert!(!game.apply_move(9, 0));
        assert!(!game.apply_move(0, 9));
    }

    #[test]
    fn test_apply_move_into_decided_board_fails() {
        let mut game = started_game();
        // X takes cells 3,4,5 of board 0 while O wanders boards 3 and 4.
        assert!(game.apply_move(0, 3)); // X → board 3
        assert!(game.apply_move(3, 0)); // O → board 0
        assert!(game.apply_move(0, 4)); // X → board 4
        assert!(game.apply_move(4, 0)); // O → board 0
        assert!(game.apply_move(0, 5)); // X wins board 0, O → board 5
        assert_eq!(game.snapshot().winners[0], X);

        assert!(game.apply_move(5, 0)); // O plays, forced index 0 is decided
        assert_eq!(game.snapshot().forced, None, "decided target board lifts the constraint");
        assert!(!game.apply_move(0, 6), "no further moves into a decided board");
    }

    #[test]
    fn test_apply_move_after_conclusion_fails() {
        let mut game = started_game();
        game.resign(Mark::O);
        assert!(!game.apply_move(0, 0));
    }

    // =====================================================================
    // decide_game
    // =====================================================================

    #[test]
    fn test_decide_game_line_wins_regardless_of_rest() {
        let winners = [X, X, X, None, None, None, None, None, None];
        assert_eq!(decide_game(&winners), Some(Outcome::X));
    }

    #[test]
    fn test_decide_game_open_when_no_line_and_boards_remain() {
        let winners = [X, O, X, None, None, None, None, None, None];
        assert_eq!(decide_game(&winners), None);
    }

    #[test]
    fn test_decide_game_tiebreak_more_boards_wins() {
        // 5 X, 3 O, 1 draw; no triple anywhere.
        let winners = [X, O, X, X, O, X, O, X, D];
        assert_eq!(decide_game(&winners), Some(Outcome::X));
    }

    #[test]
    fn test_decide_game_tiebreak_equal_counts_is_draw() {
        // 4 X, 4 O, 1 draw; no triple anywhere.
        let winners = [X, O, X, O, X, O, O, X, D];
        assert_eq!(decide_game(&winners), Some(Outcome::Draw));
    }

    #[test]
    fn test_decide_game_draw_triple_does_not_win() {
        let winners = [D, D, D, None, None, None, None, None, None];
        assert_eq!(decide_game(&winners), None);
    }

    // =====================================================================
    // resign
    // =====================================================================

    #[test]
    fn test_resign_awards_the_opponent() {
        let mut game = started_game();
        game.resign(Mark::X);
        assert_eq!(game.winner(), Some(Outcome::O));
    }

    #[test]
    fn test_resign_works_before_start() {
        let mut game = Game::new();
        game.resign(Mark::O);
        assert_eq!(game.winner(), Some(Outcome::X));
    }

    // =====================================================================
    // full games
    // =====================================================================

    /// X wins mini-boards 0, 1 and 2 in seventeen plies; every move obeys
    /// the forced-board rule.
    const X_TOP_ROW_GAME: [(usize, usize); 17] = [
        (0, 4), (4, 0), (0, 3), (3, 0), (0, 5), (5, 0),
        (1, 4), (4, 1), (1, 3), (3, 1), (1, 5), (5, 1),
        (2, 4), (4, 2), (2, 3), (3, 2), (2, 5),
    ];

    #[test]
    fn test_full_game_x_wins_top_row_of_boards() {
        let mut game = started_game();
        for (ply, (board, cell)) in X_TOP_ROW_GAME.iter().enumerate() {
            assert!(
                game.apply_move(*board, *cell),
                "ply {ply} ({board},{cell}) should be legal"
            );
        }

        let snap = game.snapshot();
        assert_eq!(snap.winners[0], X);
        assert_eq!(snap.winners[1], X);
        assert_eq!(snap.winners[2], X);
        assert_eq!(snap.game_winner, Some(Outcome::X));
        assert!(game.is_over());
    }

    #[test]
    fn test_concluded_game_outcome_is_immutable() {
        let mut game = started_game();
        for (board, cell) in X_TOP_ROW_GAME {
            game.apply_move(board, cell);
        }
        assert_eq!(game.winner(), Some(Outcome::X));
        assert!(!game.apply_move(6, 0), "no moves after conclusion");
        assert_eq!(game.winner(), Some(Outcome::X));
    }

    // =====================================================================
    // snapshot wire shape
    // =====================================================================

    #[test]
    fn test_snapshot_json_field_names() {
        let mut game = started_game();
        game.apply_move(0, 4);

        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["player"], "O");
        assert_eq!(json["forced"], 4);
        assert_eq!(json["started"], true);
        assert!(json["gameWinner"].is_null());
        assert_eq!(json["boards"][0][4], "X");
        assert!(json["winners"][0].is_null());
    }

    #[test]
    fn test_snapshot_round_trips() {
        let mut game = started_game();
        for (board, cell) in &X_TOP_ROW_GAME[..7] {
            game.apply_move(*board, *cell);
        }
        let snap = game.snapshot();
        let bytes = serde_json::to_vec(&snap).unwrap();
        let decoded: Snapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snap, decoded);
    }
}
