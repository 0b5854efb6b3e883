//! Solver for Chrooma, a marble puzzle on a small grid.
//!
//! Colored balls slide in one of the four cardinal directions until blocked,
//! then any two adjacent balls of equal color annihilate. Terrain features
//! (signs, portals, consumers, lock doors and keys) complicate a move; see
//! [`Board`] for the cell vocabulary. [`solve`] searches move sequences
//! breadth-first up to a hard limit of [`STEP_LIMIT`] user moves.

pub use board::{Board, ParseBoardError};
pub use state::State;

use itertools::Itertools;
use strum::VariantArray;

use crate::search::{breadth_first, DepthRule, StateSpace};

pub(crate) mod board;
pub(crate) mod state;

/// The four slide directions, in the order moves are attempted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, VariantArray)]
pub enum Direction {
    /// `>`
    East,
    /// `v`
    South,
    /// `<`
    West,
    /// `^`
    North,
}

impl Direction {
    // (dx, dy)
    pub(crate) fn delta(self) -> (isize, isize) {
        match self {
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::North => (0, -1),
        }
    }

    pub(crate) fn glyph(self) -> char {
        match self {
            Self::East => '>',
            Self::South => 'v',
            Self::West => '<',
            Self::North => '^',
        }
    }

    pub(crate) fn from_glyph(c: char) -> Option<Self> {
        Self::VARIANTS.iter().find(|d| d.glyph() == c).copied()
    }
}

/// Hard bound on the number of user moves a solution may take.
pub const STEP_LIMIT: usize = 10;

/// Result of a [`solve`] run.
pub enum Outcome {
    /// A clearing sequence was found.
    Solved {
        /// Each user move with the state it produced, root first.
        trace: Vec<(Direction, State)>,
    },
    /// Every reachable state was tried without clearing the board.
    NoSolution,
    /// The search frontier passed [`STEP_LIMIT`] moves.
    StepLimitExceeded,
}

struct Sliding<'a> {
    board: &'a Board,
}

impl StateSpace for Sliding<'_> {
    type State = State;
    type Action = Direction;

    fn successors(&self, state: &State) -> Vec<(Direction, State)> {
        Direction::VARIANTS
            .iter()
            .map(|&d| (d, state.apply(self.board, d)))
            .collect_vec()
    }

    fn is_goal(&self, state: &State) -> bool {
        state.won
    }

    fn is_dead(&self, state: &State) -> bool {
        state.failed
    }

    fn canonical(&self, state: &State) -> Vec<u8> {
        state.canonical_bytes()
    }

    fn depth_rule(&self, depth: usize) -> DepthRule {
        if depth > STEP_LIMIT {
            DepthRule::Abort
        } else {
            DepthRule::Expand
        }
    }
}

/// Search for a move sequence clearing every ball off `initial`.
pub fn solve(board: &Board, initial: State) -> Outcome {
    match breadth_first(&Sliding { board }, initial) {
        crate::search::Outcome::Solved { trace } => Outcome::Solved { trace },
        crate::search::Outcome::Exhausted => Outcome::NoSolution,
        crate::search::Outcome::DepthLimit => Outcome::StepLimitExceeded,
    }
}

/// Render a winning trace the way the interactive player expects it: the
/// final state first, each state followed by the direction that produced it,
/// down to the initial state, then a `Steps:` summary line in play order.
pub fn render_solution(board: &Board, initial: &State, trace: &[(Direction, State)]) -> String {
    let mut out = String::from("SUCCESS !\n");
    for (step, (direction, state)) in trace.iter().enumerate().rev() {
        out += &format!("State step: {} \n", step + 1);
        out += &state.render(board);
        out += &format!("------- {} -------\n", direction.glyph());
    }
    out += "State step: 0 \n";
    out += &initial.render(board);
    out += "-------   -------\n";
    let steps: String = trace.iter().map(|(d, _)| format!(" {}", d.glyph())).collect();
    out += &format!("Steps: {steps}\n");
    out
}
