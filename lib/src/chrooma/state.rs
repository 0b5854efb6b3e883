use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::{debug, trace};
use ndarray::Array2;

use crate::chrooma::board::{Board, Terrain};
use crate::chrooma::Direction;
use crate::location::Location;

/// The mutable ball layout of a Chrooma level.
///
/// Cells hold `0` for no ball and `1..=9` for a ball of that color. Negative
/// values appear only transiently while match-and-clear marks annihilating
/// pairs. The `won`/`failed` flags record how the last move ended; they are
/// not part of the canonical byte image.
#[derive(Clone, Debug)]
pub struct State {
    pub(crate) cells: Array2<i8>,
    pub(crate) won: bool,
    pub(crate) failed: bool,
}

impl State {
    pub(crate) fn new(cells: Array2<i8>) -> Self {
        Self {
            cells,
            won: false,
            failed: false,
        }
    }

    /// Whether the board ended cleared after the last applied move.
    pub fn is_won(&self) -> bool {
        self.won
    }

    /// The state-identifying bytes: the ball grid, row-major.
    pub(crate) fn canonical_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|&v| v as u8).collect_vec()
    }

    fn ball_at(&self, location: Location) -> i8 {
        self.cells[location.as_index()]
    }

    fn set_ball(&mut self, location: Location, v: i8) {
        self.cells[location.as_index()] = v;
    }

    /// Any ball resting on a key cell keeps every door open.
    fn board_unlocked(&self, board: &Board) -> bool {
        board.keys.iter().any(|&k| self.ball_at(k) != 0)
    }

    /// Apply one user move, returning the resulting state. The result may
    /// carry the `won` or `failed` flag.
    pub fn apply(&self, board: &Board, direction: Direction) -> State {
        let mut next = self.clone();
        next.won = false;
        next.failed = false;
        next.slide(board, direction);
        next
    }

    /// Slide every ball in `direction` until nothing moves, interleaving
    /// match-and-clear rounds, then chain into any redirect queued by a
    /// direction sign. Mutates `self` in place.
    fn slide(&mut self, board: &Board, mut direction: Direction) {
        let (w, h) = (board.dims.0.get(), board.dims.1.get());
        loop {
            let (dx, dy) = direction.delta();
            // scan along the direction of motion so a moving ball is
            // re-encountered and keeps sliding within the same pass
            let ys = if dy >= 0 {
                (0..h).collect_vec()
            } else {
                (0..h).rev().collect_vec()
            };
            let xs = if dx >= 0 {
                (0..w).collect_vec()
            } else {
                (0..w).rev().collect_vec()
            };

            // both reset at every entry, including redirect chains
            let mut killed_positions: HashSet<Location> = HashSet::new();
            let mut board_unlocked = self.board_unlocked(board);

            let mut pending: Option<Direction> = None;
            let mut first = true;
            loop {
                let mut moving = false;
                for &y in &ys {
                    for &x in &xs {
                        let at = Location(x, y);
                        let v = self.ball_at(at);
                        if v <= 0 {
                            continue;
                        }
                        let dest = at.offset_by((dx, dy));
                        if !dest.within(board.dims) {
                            continue;
                        }
                        let mut dest_terrain = board.terrain_at(dest);
                        if dest_terrain == Terrain::Door {
                            // a door over a cell cleared earlier in this move
                            // stays open even if the keys emptied meanwhile
                            let open = board_unlocked || killed_positions.contains(&dest);
                            dest_terrain = if open { Terrain::Empty } else { Terrain::Wall };
                        }
                        if dest_terrain == Terrain::Wall || self.ball_at(dest) != 0 {
                            continue;
                        }
                        if let Terrain::Sign(arrow) = board.terrain_at(at) {
                            if arrow != direction {
                                // trapped until moved along the arrow
                                continue;
                            }
                        }
                        self.set_ball(dest, v);
                        self.set_ball(at, 0);
                        moving = true;
                        match board.terrain_at(dest) {
                            Terrain::Consumer => self.set_ball(dest, 0),
                            Terrain::Portal => {
                                let exit = board.portal_exit(dest);
                                self.set_ball(dest, 0);
                                self.set_ball(exit, v);
                            }
                            Terrain::Sign(arrow) => pending = Some(arrow),
                            _ => {}
                        }
                    }
                }
                if !moving && first {
                    // the move did nothing at all
                    self.failed = true;
                    return;
                }
                if !moving && pending.is_none() {
                    let cleared = self.match_and_clear(&mut killed_positions);
                    if self.won || self.failed {
                        return;
                    }
                    if cleared {
                        // key balls may have been cleared
                        board_unlocked = self.board_unlocked(board);
                        moving = true;
                    }
                }
                first = false;
                if !moving {
                    break;
                }
            }
            match pending {
                Some(redirect) => {
                    trace!("redirect {} -> {}", direction.glyph(), redirect.glyph());
                    direction = redirect;
                }
                None => return,
            }
        }
    }

    /// Mark every horizontally or vertically adjacent equal-color pair, then
    /// clear the marks, recording their cells in `killed_positions`. Sets
    /// `won` when no ball survives and `failed` when some color has a single
    /// survivor that can never annihilate. Returns whether anything cleared.
    fn match_and_clear(&mut self, killed_positions: &mut HashSet<Location>) -> bool {
        let (h, w) = self.cells.dim();
        let mut any_marked = false;
        for y in 0..h {
            for x in 0..w {
                let v = self.cells[(y, x)].abs();
                if v == 0 {
                    continue;
                }
                if y + 1 < h && self.cells[(y + 1, x)].abs() == v {
                    self.cells[(y, x)] = -v;
                    self.cells[(y + 1, x)] = -v;
                    any_marked = true;
                }
                if x + 1 < w && self.cells[(y, x + 1)].abs() == v {
                    self.cells[(y, x)] = -v;
                    self.cells[(y, x + 1)] = -v;
                    any_marked = true;
                }
            }
        }

        let mut survivors: HashMap<i8, usize> = HashMap::new();
        for y in 0..h {
            for x in 0..w {
                let v = self.cells[(y, x)];
                if v > 0 {
                    *survivors.entry(v).or_default() += 1;
                } else if v < 0 {
                    killed_positions.insert(Location(x, y));
                    self.cells[(y, x)] = 0;
                }
            }
        }

        if survivors.is_empty() {
            self.won = true;
            return true;
        }
        if survivors.values().any(|&count| count <= 1) {
            // a lone ball of some color can never pair off
            debug!("single survivor, dead end");
            self.failed = true;
            return false;
        }
        any_marked
    }

    /// Render the grid, balls over terrain, one row per line.
    pub(crate) fn render(&self, board: &Board) -> String {
        let (h, w) = self.cells.dim();
        let mut out = String::with_capacity(h * (w + 1));
        for y in 0..h {
            for x in 0..w {
                let v = self.cells[(y, x)];
                if v > 0 {
                    out.push((b'0' + v as u8) as char);
                } else {
                    out.push(board.terrain[(y, x)].glyph());
                }
            }
            out.push('\n');
        }
        out
    }
}
