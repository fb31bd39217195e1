//! Square cell grid holding one generation of the colony.

use crate::error::{EngineError, GridError};
use serde::{Deserialize, Serialize};

/// State of a single grid position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl Cell {
    /// Decode the 0/1 representation
    #[inline]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Cell::Dead),
            1 => Some(Cell::Alive),
            _ => None,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

/// An N×N generation snapshot.
///
/// Cells are stored row-major in one contiguous buffer. A `Grid` is never
/// mutated once built; editing helpers such as [`Grid::with_cell`] return a
/// new grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    dimension: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-dead grid
    pub fn new(dimension: usize) -> Result<Self, EngineError> {
        if dimension == 0 {
            return Err(EngineError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            cells: vec![Cell::Dead; dimension * dimension],
        })
    }

    /// Build a grid from rows of 0/1 values.
    ///
    /// Every row must have as many cells as there are rows.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, EngineError> {
        let dimension = rows.len();
        if dimension == 0 {
            return Err(GridError::Empty.into());
        }

        let mut cells = Vec::with_capacity(dimension * dimension);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != dimension {
                return Err(GridError::NotSquare {
                    row,
                    expected: dimension,
                    found: values.len(),
                }
                .into());
            }
            for (col, &value) in values.iter().enumerate() {
                let cell = Cell::from_u8(value)
                    .ok_or(GridError::InvalidCellValue { row, col, value })?;
                cells.push(cell);
            }
        }

        Ok(Self { dimension, cells })
    }

    /// Build a grid from a row-major cell buffer
    pub fn from_cells(dimension: usize, cells: Vec<Cell>) -> Result<Self, EngineError> {
        if dimension == 0 {
            return Err(EngineError::InvalidDimension(dimension));
        }
        let expected = dimension * dimension;
        if cells.len() != expected {
            return Err(GridError::CellCount {
                expected,
                found: cells.len(),
            }
            .into());
        }
        Ok(Self { dimension, cells })
    }

    /// Caller guarantees `dimension > 0` and `cells.len() == dimension²`
    pub(crate) fn from_raw(dimension: usize, cells: Vec<Cell>) -> Self {
        debug_assert!(dimension > 0 && cells.len() == dimension * dimension);
        Self { dimension, cells }
    }

    /// Grid side length
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Cell at (row, col), `None` when outside the grid
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.dimension && col < self.dimension {
            Some(self.cells[row * self.dimension + col])
        } else {
            None
        }
    }

    /// Out-of-range positions read as dead
    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(Cell::is_alive)
    }

    /// Row-major view of all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(self.dimension)
    }

    /// Copy out as rows of 0/1 values
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows()
            .map(|row| row.iter().map(|c| c.as_u8()).collect())
            .collect()
    }

    /// Positions of every live cell, row-major order
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let dimension = self.dimension;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(move |(i, _)| (i / dimension, i % dimension))
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Fraction of cells alive (0.0 - 1.0)
    pub fn density(&self) -> f64 {
        self.population() as f64 / self.cells.len() as f64
    }

    /// Copy of this grid with one cell replaced
    pub fn with_cell(&self, row: usize, col: usize, cell: Cell) -> Result<Self, EngineError> {
        self.check_bounds(row, col)?;
        let mut next = self.clone();
        next.cells[row * self.dimension + col] = cell;
        Ok(next)
    }

    /// Whether the buffer length agrees with the dimension, without overflow
    pub(crate) fn has_consistent_shape(&self) -> bool {
        self.dimension > 0 && self.dimension.checked_mul(self.dimension) == Some(self.cells.len())
    }

    pub(crate) fn check_bounds(&self, row: usize, col: usize) -> Result<(), EngineError> {
        if row < self.dimension && col < self.dimension {
            Ok(())
        } else {
            Err(EngineError::OutOfRange {
                row,
                col,
                dimension: self.dimension,
            })
        }
    }
}
