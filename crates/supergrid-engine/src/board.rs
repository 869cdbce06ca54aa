//! Single mini-board primitives: marks, outcomes, win/draw detection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player's mark. `X` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Returns the other player's mark.
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// The decided result of a mini-board or of the whole game.
///
/// Serialized as `"X"`, `"O"`, or `"D"` — the wire format the client
/// renders directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    X,
    O,
    #[serde(rename = "D")]
    Draw,
}

impl Outcome {
    /// The winning mark, if this outcome is a win.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Outcome::X => Some(Mark::X),
            Outcome::O => Some(Mark::O),
            Outcome::Draw => None,
        }
    }
}

impl From<Mark> for Outcome {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Outcome::X,
            Mark::O => Outcome::O,
        }
    }
}

/// The eight winning triples of a 3x3 grid, by cell index.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// One mini-board: nine cells, row-major.
pub type Cells = [Option<Mark>; 9];

/// Decides a mini-board: a completed triple wins, a full board with no
/// triple is a draw, anything else is still open.
pub fn outcome_of(cells: &Cells) -> Option<Outcome> {
    for line in WIN_LINES {
        if let Some(mark) = cells[line[0]] {
            if cells[line[1]] == Some(mark) && cells[line[2]] == Some(mark) {
                return Some(Outcome::from(mark));
            }
        }
    }
    if cells.iter().all(Option::is_some) {
        return Some(Outcome::Draw);
    }
    None
}
