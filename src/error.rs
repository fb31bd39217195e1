//! Error types for the simulation engine.
//!
//! Every variant here is a contract violation by the caller. Nothing is
//! transient, so nothing is retried.

use thiserror::Error;

/// Errors raised by [`Engine`](crate::engine::Engine) and grid operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Grid dimension must be at least 1.
    #[error("invalid dimension: {0} (must be > 0)")]
    InvalidDimension(usize),

    /// Cell coordinates outside `[0, dimension)`.
    #[error("cell ({row}, {col}) is out of range for a {dimension}x{dimension} grid")]
    OutOfRange {
        row: usize,
        col: usize,
        dimension: usize,
    },

    /// A grid whose dimension disagrees with the engine or the other operand.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// No seed pattern is registered under this name.
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    /// The pattern's bounding box is larger than the grid.
    #[error("pattern {name} does not fit a {dimension}x{dimension} grid")]
    PatternTooLarge { name: String, dimension: usize },

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Errors raised while building a [`Grid`](crate::grid::Grid) from raw data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has no rows")]
    Empty,

    /// Row `row` has `found` cells where `expected` were required.
    #[error("row {row} has {found} cells, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Cell values are restricted to 0 (dead) and 1 (alive).
    #[error("invalid cell value {value} at ({row}, {col})")]
    InvalidCellValue { row: usize, col: usize, value: u8 },

    #[error("expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::OutOfRange {
            row: 5,
            col: 1,
            dimension: 3,
        };
        assert_eq!(
            err.to_string(),
            "cell (5, 1) is out of range for a 3x3 grid"
        );

        let err = EngineError::DimensionMismatch {
            expected: 4,
            found: 5,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 4, found 5");

        let err = EngineError::PatternTooLarge {
            name: "beacon".to_string(),
            dimension: 3,
        };
        assert_eq!(err.to_string(), "pattern beacon does not fit a 3x3 grid");
    }

    #[test]
    fn test_grid_error_wraps_transparently() {
        let err: EngineError = GridError::Empty.into();
        assert_eq!(err.to_string(), "grid has no rows");
        assert!(matches!(err, EngineError::Grid(GridError::Empty)));
    }
}
