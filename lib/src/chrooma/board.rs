use std::num::NonZero;

use ndarray::Array2;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::chrooma::state::State;
use crate::chrooma::Direction;
use crate::location::{Dimension, Location};

/// One cell of the immutable terrain layer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Terrain {
    #[default]
    Empty,
    Wall,
    /// Passable, but a ball resting here may only leave along the arrow, and
    /// a ball arriving here queues a redirect of the whole move.
    Sign(Direction),
    /// Consumes any ball arriving here.
    Consumer,
    /// Paired teleport endpoint.
    Portal,
    /// Wall while the board is locked, empty while it is unlocked.
    Door,
    /// While any ball occupies a key cell, all doors are unlocked.
    Key,
}

impl Terrain {
    pub(crate) fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => ' ',
            Self::Sign(d) => d.glyph(),
            Self::Consumer => '*',
            Self::Portal => '@',
            Self::Door => 'x',
            Self::Key => 'o',
        }
    }
}

/// Why a board failed to parse.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseBoardError {
    /// Rows of unequal width, or no rows at all.
    #[error("Incorrect board size")]
    NotRectangular,
    /// Portals come in exactly zero or two.
    #[error("expected zero or two portals, found {0}")]
    PortalCount(usize),
    /// A character outside the board vocabulary.
    #[error("unrecognized cell {0:?}")]
    UnknownCell(char),
}

/// The immutable part of a Chrooma level: terrain, key cells and the portal
/// pairing. The mutable ball layout lives in [`State`].
#[derive(Debug)]
pub struct Board {
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) terrain: Array2<Terrain>,
    pub(crate) keys: Vec<Location>,
    pub(crate) portals: Option<UnorderedPair<Location>>,
}

impl Board {
    /// Parse a newline-separated rectangular grid. Digits `1`..`9` become
    /// balls of that color resting on empty terrain; `0` is an empty cell.
    /// Returns the terrain and the initial ball state together.
    pub fn parse(text: &str) -> Result<(Board, State), ParseBoardError> {
        let rows = text.lines().collect::<Vec<_>>();
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if height == 0 || width == 0 || rows.iter().any(|r| r.chars().count() != width) {
            return Err(ParseBoardError::NotRectangular);
        }

        let mut terrain = Array2::from_elem((height, width), Terrain::Empty);
        let mut cells = Array2::zeros((height, width));
        let mut keys = Vec::new();
        let mut portal_cells = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                terrain[(y, x)] = match c {
                    '.' => Terrain::Empty,
                    ' ' => Terrain::Wall,
                    '*' => Terrain::Consumer,
                    '@' => {
                        portal_cells.push(Location(x, y));
                        Terrain::Portal
                    }
                    'x' => Terrain::Door,
                    'o' => {
                        keys.push(Location(x, y));
                        Terrain::Key
                    }
                    '>' | 'v' | '<' | '^' => Terrain::Sign(Direction::from_glyph(c).unwrap()),
                    '0' => Terrain::Empty,
                    '1'..='9' => {
                        cells[(y, x)] = c as i8 - '0' as i8;
                        Terrain::Empty
                    }
                    other => return Err(ParseBoardError::UnknownCell(other)),
                };
            }
        }

        let portals = match portal_cells.len() {
            0 => None,
            2 => Some(UnorderedPair::from((portal_cells[0], portal_cells[1]))),
            n => return Err(ParseBoardError::PortalCount(n)),
        };

        let board = Board {
            dims: (
                NonZero::new(width).unwrap(),
                NonZero::new(height).unwrap(),
            ),
            terrain,
            keys,
            portals,
        };
        Ok((board, State::new(cells)))
    }

    pub(crate) fn terrain_at(&self, location: Location) -> Terrain {
        self.terrain[location.as_index()]
    }

    /// The other end of the portal pair.
    pub(crate) fn portal_exit(&self, entry: Location) -> Location {
        let pair = self.portals.expect("ball entered a portal on a board without a pairing");
        if pair.0 == entry {
            pair.1
        } else {
            pair.0
        }
    }
}
