//! Configuration system for bacteria life sessions.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::patterns;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the square grid
    pub dimension: usize,
    /// Random seed for the initial generation
    pub seed: Option<u64>,
    /// Named seed pattern used instead of random noise
    pub pattern: Option<String>,
}

/// Evolution loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Stop after this many rounds even if no fixed point was found
    pub max_rounds: u64,
    /// Delay between rounds in milliseconds (0 runs flat out)
    pub tick_ms: u64,
}

/// Logging and checkpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Rounds between stats snapshots
    pub stats_interval: u64,
    /// Rounds between checkpoints (0 disables)
    pub checkpoint_interval: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dimension: 30,
            seed: None,
            pattern: None,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10_000,
            tick_ms: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 10,
            checkpoint_interval: 0,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.world.dimension == 0 {
            return Err("dimension must be > 0".to_string());
        }
        if self.logging.stats_interval == 0 {
            return Err("stats_interval must be > 0".to_string());
        }
        if let Some(name) = &self.world.pattern {
            let pattern =
                patterns::find(name).ok_or_else(|| format!("unknown pattern: {}", name))?;
            if !pattern.fits(self.world.dimension) {
                return Err(format!(
                    "pattern {} does not fit a {}x{} grid",
                    pattern.name, self.world.dimension, self.world.dimension
                ));
            }
        }
        Ok(())
    }
}
