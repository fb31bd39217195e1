//! Named seed patterns.
//!
//! Cells are (row, col) offsets from the pattern's top-left corner. Placing a
//! pattern centres its bounding box on the grid.

use crate::error::EngineError;
use crate::grid::{Cell, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(usize, usize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "block",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1)],
    },
    Pattern {
        name: "beehive",
        cells: &[(0, 1), (0, 2), (1, 0), (1, 3), (2, 1), (2, 2)],
    },
    Pattern {
        name: "blinker",
        cells: &[(0, 0), (0, 1), (0, 2)],
    },
    Pattern {
        name: "toad",
        cells: &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "beacon",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)],
    },
    Pattern {
        name: "glider",
        cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
    },
    Pattern {
        name: "r-pentomino",
        cells: &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)],
    },
];

/// Look up a pattern by name, ignoring case
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Pattern {
    /// Bounding box as (height, width)
    pub fn extent(&self) -> (usize, usize) {
        let height = self.cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0);
        let width = self.cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0);
        (height, width)
    }

    /// Whether the pattern fits on a grid of this dimension
    pub fn fits(&self, dimension: usize) -> bool {
        let (height, width) = self.extent();
        height <= dimension && width <= dimension
    }

    /// Place the pattern centred on an otherwise dead grid
    pub fn place(&self, dimension: usize) -> Result<Grid, EngineError> {
        let mut grid = Grid::new(dimension)?;
        if !self.fits(dimension) {
            return Err(EngineError::PatternTooLarge {
                name: self.name.to_string(),
                dimension,
            });
        }

        let (height, width) = self.extent();
        let top = (dimension - height) / 2;
        let left = (dimension - width) / 2;
        for &(r, c) in self.cells {
            grid = grid.with_cell(top + r, left + c, Cell::Alive)?;
        }
        Ok(grid)
    }
}
