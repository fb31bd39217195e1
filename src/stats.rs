//! Statistics tracking for a simulation session.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// Statistics snapshot for one round
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Engine round this snapshot describes
    pub round: u64,
    /// Live cells
    pub population: usize,
    /// Cells that came alive this round
    pub births: usize,
    /// Cells that died this round
    pub deaths: usize,
    /// Fraction of the grid alive
    pub density: f64,
}

impl Stats {
    /// Snapshot of a seed grid before any step
    pub fn initial(grid: &Grid) -> Self {
        Self {
            round: 0,
            population: grid.population(),
            births: 0,
            deaths: 0,
            density: grid.density(),
        }
    }

    /// Compare two consecutive generations of the same dimension
    pub fn between(round: u64, previous: &Grid, next: &Grid) -> Self {
        let mut births = 0;
        let mut deaths = 0;
        for (before, after) in previous.cells().iter().zip(next.cells()) {
            match (before.is_alive(), after.is_alive()) {
                (false, true) => births += 1,
                (true, false) => deaths += 1,
                _ => {}
            }
        }

        Self {
            round,
            population: next.population(),
            births,
            deaths,
            density: next.density(),
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "R:{:6} | Pop:{:6} | Born:{:5} | Died:{:5} | Density:{:.3}",
            self.round, self.population, self.births, self.deaths, self.density
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval in rounds
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Record the snapshot if its round falls on the interval
    pub fn observe(&mut self, stats: &Stats) {
        if stats.round % self.interval == 0 {
            self.record(stats.clone());
        }
    }

    /// Record a stats snapshot unconditionally
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.round, s.population))
            .collect()
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&Stats> {
        self.snapshots.last()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_between() {
        let previous = Grid::from_rows(vec![vec![1, 1], vec![0, 0]]).unwrap();
        let next = Grid::from_rows(vec![vec![0, 1], vec![1, 1]]).unwrap();

        let stats = Stats::between(4, &previous, &next);
        assert_eq!(stats.round, 4);
        assert_eq!(stats.population, 3);
        assert_eq!(stats.births, 2);
        assert_eq!(stats.deaths, 1);
        assert!((stats.density - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new(10);

        for i in 0..50 {
            let stats = Stats {
                round: i,
                population: i as usize * 2,
                ..Stats::default()
            };
            history.observe(&stats);
        }

        let series = history.population_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (0, 0));
        assert_eq!(series[4], (40, 80));
        assert_eq!(history.latest().map(|s| s.round), Some(40));
    }

    #[test]
    fn test_history_json_roundtrip() {
        let mut history = StatsHistory::new(1);
        history.record(Stats {
            round: 3,
            population: 12,
            ..Stats::default()
        });

        let path = std::env::temp_dir().join("bacteria_life_test_history.json");
        let path = path.to_string_lossy().to_string();
        history.save(&path).unwrap();
        let loaded = StatsHistory::load(&path).unwrap();
        assert_eq!(loaded.snapshots, history.snapshots);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_summary_mentions_round() {
        let stats = Stats {
            round: 12,
            population: 7,
            ..Stats::default()
        };
        assert!(stats.summary().contains("R:    12"));
    }
}
