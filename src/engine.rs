//! Simulation engine - generation stepping and stability detection.
//!
//! Rules (B3/S23, no wraparound):
//! - a live cell with fewer than 2 live neighbours dies
//! - a live cell with 2 or 3 live neighbours survives
//! - a live cell with more than 3 live neighbours dies
//! - a dead cell with exactly 3 live neighbours comes alive

use crate::error::EngineError;
use crate::grid::{Cell, Grid};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Relative positions of the eight surrounding cells
const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Probability that a seeded cell starts alive
const INITIAL_ALIVE_PROBABILITY: f64 = 0.5;

/// Cellular automaton engine for one simulation session.
///
/// The engine holds the grid dimension, the round counter and a seeded random
/// source. Grid contents are passed in and returned, never retained.
#[derive(Debug, Clone)]
pub struct Engine {
    dimension: usize,
    round: u64,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Engine {
    /// Create an engine with a random seed
    pub fn new(dimension: usize) -> Result<Self, EngineError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(dimension, seed)
    }

    /// Create an engine with a specific seed for reproducible initial grids
    pub fn new_with_seed(dimension: usize, seed: u64) -> Result<Self, EngineError> {
        Self::resume(dimension, seed, 0)
    }

    /// Rebuild an engine that has already computed `round` generations
    pub(crate) fn resume(dimension: usize, seed: u64, round: u64) -> Result<Self, EngineError> {
        if dimension == 0 {
            return Err(EngineError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            round,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Seed the engine's random source was created from
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generations successfully computed so far
    #[inline]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Fresh random grid drawn from the engine's own generator
    pub fn generate_initial_gen(&mut self) -> Grid {
        random_grid(self.dimension, &mut self.rng)
    }

    /// Fresh random grid drawn from a caller-supplied generator
    pub fn generate_initial_gen_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        random_grid(self.dimension, rng)
    }

    /// Count live cells adjacent to (row, col), edges not wrapped.
    ///
    /// Bounded by the grid's own dimension. The result is always in `0..=8`.
    pub fn check_neighbours(grid: &Grid, row: usize, col: usize) -> Result<u8, EngineError> {
        grid.check_bounds(row, col)?;
        Ok(count_live_neighbours(grid, row, col))
    }

    /// Transition rule for one cell
    #[inline]
    pub fn next_state(cell: Cell, neighbours: u8) -> Cell {
        match (cell, neighbours) {
            (Cell::Alive, 2 | 3) => Cell::Alive,
            (Cell::Dead, 3) => Cell::Alive,
            _ => Cell::Dead,
        }
    }

    /// Compute the next generation from `current`.
    ///
    /// Every neighbour count reads the old generation; `current` is never
    /// touched. Advances the round counter only on success.
    pub fn generate_new_gen(&mut self, current: &Grid) -> Result<Grid, EngineError> {
        if current.dimension() != self.dimension {
            return Err(EngineError::DimensionMismatch {
                expected: self.dimension,
                found: current.dimension(),
            });
        }

        let dimension = self.dimension;
        let old = current.cells();
        let mut cells = vec![Cell::Dead; dimension * dimension];

        // Rows are independent: each reads only from `current`
        cells
            .par_chunks_mut(dimension)
            .enumerate()
            .for_each(|(row, out)| {
                for (col, slot) in out.iter_mut().enumerate() {
                    let neighbours = count_live_neighbours(current, row, col);
                    *slot = Self::next_state(old[row * dimension + col], neighbours);
                }
            });

        let next = Grid::from_raw(dimension, cells);
        self.round += 1;

        log::trace!(
            "Round {}: population {} -> {}",
            self.round,
            current.population(),
            next.population()
        );

        Ok(next)
    }

    /// Period-1 fixed point test: true iff both grids are cell-for-cell equal.
    ///
    /// Oscillators of period 2 or more (a blinker, say) are never reported as
    /// stable.
    pub fn check_stable_gen(a: &Grid, b: &Grid) -> Result<bool, EngineError> {
        if a.dimension() != b.dimension() {
            return Err(EngineError::DimensionMismatch {
                expected: a.dimension(),
                found: b.dimension(),
            });
        }
        Ok(a.cells() == b.cells())
    }
}

fn random_grid<R: Rng + ?Sized>(dimension: usize, rng: &mut R) -> Grid {
    let cells = (0..dimension * dimension)
        .map(|_| Cell::from(rng.gen_bool(INITIAL_ALIVE_PROBABILITY)))
        .collect();
    Grid::from_raw(dimension, cells)
}

#[inline]
fn count_live_neighbours(grid: &Grid, row: usize, col: usize) -> u8 {
    NEIGHBOUR_OFFSETS
        .iter()
        .filter(|&&(dr, dc)| {
            match (row.checked_add_signed(dr), col.checked_add_signed(dc)) {
                (Some(r), Some(c)) => grid.is_alive(r, c),
                _ => false,
            }
        })
        .count() as u8
}
