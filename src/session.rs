//! Headless driver - the evolve loop around an [`Engine`].
//!
//! A session starts `Seeded`, becomes `Evolving` on its first step and ends
//! `Halted` once two consecutive generations are identical, the round limit
//! is reached, or the caller cancels it.

use crate::checkpoint::Checkpoint;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::patterns::{self, Pattern};
use crate::stats::{Stats, StatsHistory};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HaltReason {
    /// Two consecutive generations were identical
    Stable,
    /// Stopped from outside
    Cancelled,
    /// `max_rounds` steps ran without reaching a fixed point
    RoundLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Seeded,
    Evolving,
    Halted(HaltReason),
}

/// Result of a single [`Session::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new generation was adopted
    Advanced,
    /// The new generation matched the old one; the session is now halted
    Stable,
    /// The session was already halted, nothing was computed
    Halted(HaltReason),
}

/// One simulation session: an engine plus the current generation
pub struct Session {
    engine: Engine,
    grid: Grid,
    state: SessionState,
    stats: Stats,
    history: StatsHistory,
}

impl Session {
    /// Start from a given seed grid
    pub fn new(engine: Engine, initial: Grid) -> Result<Self, EngineError> {
        if initial.dimension() != engine.dimension() {
            return Err(EngineError::DimensionMismatch {
                expected: engine.dimension(),
                found: initial.dimension(),
            });
        }

        Ok(Self::seeded(engine, initial))
    }

    /// Start from the engine's random initial generation
    pub fn random(mut engine: Engine) -> Self {
        let initial = engine.generate_initial_gen();
        Self::seeded(engine, initial)
    }

    fn seeded(engine: Engine, initial: Grid) -> Self {
        let stats = Stats::initial(&initial);
        let mut history = StatsHistory::new(1);
        history.record(stats.clone());

        Self {
            engine,
            grid: initial,
            state: SessionState::Seeded,
            stats,
            history,
        }
    }

    /// Start from a named pattern centred on the grid
    pub fn from_pattern(engine: Engine, pattern: &Pattern) -> Result<Self, EngineError> {
        let initial = pattern.place(engine.dimension())?;
        Self::new(engine, initial)
    }

    /// Build engine and seed generation from configuration
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let dimension = config.world.dimension;
        let engine = match config.world.seed {
            Some(seed) => Engine::new_with_seed(dimension, seed)?,
            None => Engine::new(dimension)?,
        };

        let session = match &config.world.pattern {
            Some(name) => {
                let pattern =
                    patterns::find(name).ok_or_else(|| EngineError::UnknownPattern(name.clone()))?;
                Self::from_pattern(engine, pattern)?
            }
            None => Self::random(engine),
        };

        Ok(session.with_stats_interval(config.logging.stats_interval))
    }

    /// Restore a session saved with [`Session::create_checkpoint`].
    ///
    /// Only a fixed point is terminal across a restore; a session stopped by
    /// cancellation or the round limit continues evolving.
    pub fn from_checkpoint(checkpoint: Checkpoint) -> Result<Self, EngineError> {
        let engine = Engine::resume(
            checkpoint.grid.dimension(),
            checkpoint.seed,
            checkpoint.round,
        )?;

        let state = match checkpoint.halted {
            Some(HaltReason::Stable) => SessionState::Halted(HaltReason::Stable),
            _ if checkpoint.round == 0 => SessionState::Seeded,
            _ => SessionState::Evolving,
        };

        let stats = Stats {
            round: checkpoint.round,
            ..Stats::initial(&checkpoint.grid)
        };

        Ok(Self {
            engine,
            grid: checkpoint.grid,
            state,
            stats,
            history: StatsHistory::new(1),
        })
    }

    /// Record stats history every `interval` rounds instead of every round
    pub fn with_stats_interval(mut self, interval: u64) -> Self {
        let mut history = StatsHistory::new(interval);
        for stats in self.history.snapshots.drain(..) {
            history.observe(&stats);
        }
        self.history = history;
        self
    }

    /// Snapshot of the current state
    pub fn create_checkpoint(&self) -> Checkpoint {
        let halted = match self.state {
            SessionState::Halted(reason) => Some(reason),
            _ => None,
        };
        Checkpoint::new(
            self.engine.round(),
            self.engine.seed(),
            self.grid.clone(),
            halted,
        )
    }

    /// Compute one generation and test it against the current one
    pub fn step(&mut self) -> Result<StepOutcome, EngineError> {
        if let SessionState::Halted(reason) = self.state {
            return Ok(StepOutcome::Halted(reason));
        }
        self.state = SessionState::Evolving;

        let next = self.engine.generate_new_gen(&self.grid)?;
        if Engine::check_stable_gen(&self.grid, &next)? {
            self.halt(HaltReason::Stable);
            return Ok(StepOutcome::Stable);
        }

        self.stats = Stats::between(self.engine.round(), &self.grid, &next);
        self.history.observe(&self.stats);
        self.grid = next;

        log::debug!("{}", self.stats.summary());

        Ok(StepOutcome::Advanced)
    }

    /// Stop the session from outside
    pub fn cancel(&mut self) {
        if !self.is_halted() {
            self.halt(HaltReason::Cancelled);
        }
    }

    /// Step until halted or `max_rounds` steps have run
    pub fn run(&mut self, max_rounds: u64) -> Result<HaltReason, EngineError> {
        self.run_with_callback(max_rounds, |_| ControlFlow::Continue(()))
    }

    /// Like [`Session::run`], checking `cancel` before every step
    pub fn run_with_cancel(
        &mut self,
        max_rounds: u64,
        cancel: &AtomicBool,
    ) -> Result<HaltReason, EngineError> {
        self.run_with_callback(max_rounds, |_| {
            if cancel.load(Ordering::Relaxed) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Step until halted, calling `callback` before every step.
    ///
    /// Returning `Break` from the callback cancels the session.
    pub fn run_with_callback<F>(
        &mut self,
        max_rounds: u64,
        mut callback: F,
    ) -> Result<HaltReason, EngineError>
    where
        F: FnMut(&Session) -> ControlFlow<()>,
    {
        for _ in 0..max_rounds {
            if callback(self).is_break() {
                self.cancel();
            }
            match self.step()? {
                StepOutcome::Advanced => {}
                StepOutcome::Stable => return Ok(HaltReason::Stable),
                StepOutcome::Halted(reason) => return Ok(reason),
            }
        }

        if let SessionState::Halted(reason) = self.state {
            return Ok(reason);
        }
        self.halt(HaltReason::RoundLimit);
        Ok(HaltReason::RoundLimit)
    }

    fn halt(&mut self, reason: HaltReason) {
        self.state = SessionState::Halted(reason);
        log::info!(
            "Session halted at round {}: {:?} (population {})",
            self.engine.round(),
            reason,
            self.grid.population()
        );
    }

    /// Current generation
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Engine round counter
    pub fn round(&self) -> u64 {
        self.engine.round()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.state, SessionState::Halted(_))
    }

    /// Stats for the last adopted generation
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn history(&self) -> &StatsHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blinker_session() -> Session {
        let engine = Engine::new_with_seed(5, 1).unwrap();
        Session::from_pattern(engine, patterns::find("blinker").unwrap()).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let engine = Engine::new_with_seed(4, 0).unwrap();
        let block = patterns::find("block").unwrap();
        let mut session = Session::from_pattern(engine, block).unwrap();
        assert_eq!(session.state(), SessionState::Seeded);

        assert_eq!(session.step().unwrap(), StepOutcome::Stable);
        assert_eq!(session.state(), SessionState::Halted(HaltReason::Stable));

        // the engine still counted the step that found the fixed point
        assert_eq!(session.round(), 1);

        assert_eq!(
            session.step().unwrap(),
            StepOutcome::Halted(HaltReason::Stable)
        );
        assert_eq!(session.round(), 1);
    }

    #[test]
    fn test_blinker_never_stabilises() {
        let mut session = blinker_session();
        let start = session.grid().clone();

        assert_eq!(session.step().unwrap(), StepOutcome::Advanced);
        assert_eq!(session.state(), SessionState::Evolving);
        assert_eq!(session.step().unwrap(), StepOutcome::Advanced);
        assert_eq!(session.grid(), &start);

        assert_eq!(session.run(20).unwrap(), HaltReason::RoundLimit);
        assert_eq!(session.round(), 22);
        assert_eq!(session.state(), SessionState::Halted(HaltReason::RoundLimit));
    }

    #[test]
    fn test_lonely_cell_dies_out() {
        let engine = Engine::new_with_seed(3, 0).unwrap();
        let initial = Grid::from_rows(vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 0]]).unwrap();
        let mut session = Session::new(engine, initial).unwrap();

        assert_eq!(session.run(100).unwrap(), HaltReason::Stable);
        assert_eq!(session.grid().population(), 0);
        // one step to die, one to confirm the empty grid
        assert_eq!(session.round(), 2);
    }

    #[test]
    fn test_cancel() {
        let mut session = blinker_session();
        session.step().unwrap();
        session.cancel();

        assert_eq!(session.state(), SessionState::Halted(HaltReason::Cancelled));
        assert_eq!(
            session.step().unwrap(),
            StepOutcome::Halted(HaltReason::Cancelled)
        );
    }

    #[test]
    fn test_run_with_cancel_flag() {
        let mut session = blinker_session();
        let cancel = AtomicBool::new(true);

        assert_eq!(
            session.run_with_cancel(10, &cancel).unwrap(),
            HaltReason::Cancelled
        );
        assert_eq!(session.round(), 0);
    }

    #[test]
    fn test_callback_break_cancels() {
        let mut session = blinker_session();
        let reason = session
            .run_with_callback(100, |s| {
                if s.round() >= 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();

        assert_eq!(reason, HaltReason::Cancelled);
        assert_eq!(session.round(), 3);
    }

    #[test]
    fn test_new_rejects_mismatched_grid() {
        let engine = Engine::new_with_seed(4, 0).unwrap();
        assert!(matches!(
            Session::new(engine, Grid::new(5).unwrap()),
            Err(EngineError::DimensionMismatch {
                expected: 4,
                found: 5
            })
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.world.dimension = 12;
        config.world.seed = Some(99);

        let a = Session::from_config(&config).unwrap();
        let b = Session::from_config(&config).unwrap();
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.engine().seed(), 99);

        config.world.pattern = Some("nothing".to_string());
        assert!(matches!(
            Session::from_config(&config),
            Err(EngineError::UnknownPattern(_))
        ));
    }

    #[test]
    fn test_history_interval() {
        let mut session = blinker_session().with_stats_interval(5);
        session.run(12).unwrap();

        let rounds: Vec<u64> = session
            .history()
            .population_series()
            .iter()
            .map(|&(round, _)| round)
            .collect();
        assert_eq!(rounds, vec![0, 5, 10]);
        assert_eq!(session.stats().round, 12);
        assert_eq!(session.stats().population, 3);
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut session = blinker_session();
        session.run(3).unwrap();

        let checkpoint = session.create_checkpoint();
        assert_eq!(checkpoint.halted, Some(HaltReason::RoundLimit));

        let mut restored = Session::from_checkpoint(checkpoint).unwrap();
        assert_eq!(restored.state(), SessionState::Evolving);
        assert_eq!(restored.round(), 3);
        assert_eq!(restored.grid(), session.grid());

        restored.step().unwrap();
        assert_eq!(restored.round(), 4);
    }
}
