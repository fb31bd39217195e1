//! # Bacteria Life
//!
//! Cellular automaton engine for a bacteria colony on a square grid.
//!
//! ## Features
//!
//! - **Bounded**: edges do not wrap; corner cells have three neighbours
//! - **Pure steps**: each generation is a function of the previous one only
//! - **Parallel**: rows of a generation are computed across cores via Rayon
//! - **Reproducible**: seeded random initial generations
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust
//! use bacteria_life::{Engine, Grid};
//!
//! let mut engine = Engine::new_with_seed(3, 42).unwrap();
//! let current = Grid::from_rows(vec![
//!     vec![1, 1, 0],
//!     vec![1, 0, 0],
//!     vec![0, 0, 0],
//! ])
//! .unwrap();
//!
//! let next = engine.generate_new_gen(&current).unwrap();
//! assert!(next.is_alive(1, 1));
//! assert_eq!(engine.round(), 1);
//! assert!(!Engine::check_stable_gen(&current, &next).unwrap());
//! ```
//!
//! ## Sessions
//!
//! ```rust
//! use bacteria_life::{Engine, HaltReason, Session};
//!
//! let engine = Engine::new_with_seed(30, 7).unwrap();
//! let mut session = Session::random(engine);
//! let reason = session.run(500).unwrap();
//! assert!(matches!(reason, HaltReason::Stable | HaltReason::RoundLimit));
//! ```

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod session;
pub mod stats;

// Re-export main types
pub use config::Config;
pub use engine::Engine;
pub use error::{EngineError, GridError};
pub use grid::{Cell, Grid};
pub use session::{HaltReason, Session, SessionState, StepOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark on a random grid
pub fn benchmark(rounds: u64, dimension: usize) -> Result<BenchmarkResult, EngineError> {
    use std::time::Instant;

    let mut engine = Engine::new_with_seed(dimension, 0x5EED)?;
    let mut grid = engine.generate_initial_gen();
    let initial_population = grid.population();

    // Stepping continues past fixed points so every round does full work
    let start = Instant::now();
    for _ in 0..rounds {
        grid = engine.generate_new_gen(&grid)?;
    }
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        rounds,
        dimension,
        initial_population,
        final_population: grid.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        rounds_per_second: rounds as f64 / elapsed.as_secs_f64(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub rounds: u64,
    pub dimension: usize,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub rounds_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Grid: {}x{}", self.dimension, self.dimension)?;
        writeln!(f, "Rounds: {}", self.rounds)?;
        writeln!(
            f,
            "Population: {} -> {}",
            self.initial_population, self.final_population
        )?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} rounds/s", self.rounds_per_second)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(20, 16).unwrap();

        assert_eq!(result.rounds, 20);
        assert_eq!(result.dimension, 16);
        assert!(result.rounds_per_second > 0.0);
    }

    #[test]
    fn test_benchmark_rejects_zero_dimension() {
        assert_eq!(
            benchmark(1, 0).unwrap_err(),
            EngineError::InvalidDimension(0)
        );
    }
}
