//! Checkpoint system for saving and loading session state.
//!
//! Only the current generation is stored; earlier generations are not kept.

use crate::grid::Grid;
use crate::session::HaltReason;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Magic bytes at the start of every checkpoint file
const MAGIC: &[u8; 4] = b"BACT";

/// Session state for checkpointing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Engine round at the time of the snapshot
    pub round: u64,
    /// Engine random seed
    pub seed: u64,
    /// Current generation
    pub grid: Grid,
    /// Set when the session had already stopped
    pub halted: Option<HaltReason>,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    pub fn new(round: u64, seed: u64, grid: Grid, halted: Option<HaltReason>) -> Self {
        Self {
            version: Self::VERSION,
            round,
            seed,
            grid,
            halted,
        }
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CheckpointError::InvalidFormat(
                "invalid magic bytes".to_string(),
            ));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let checkpoint: Checkpoint = bincode::deserialize(&buffer)?;

        if checkpoint.version != Self::VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }

        // Serialized grids bypass constructor validation
        if !checkpoint.grid.has_consistent_shape() {
            return Err(CheckpointError::InvalidFormat(
                "grid shape does not match its dimension".to_string(),
            ));
        }

        Ok(checkpoint)
    }

    /// Get approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        MAGIC.len() + bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Prefix shared by the rotating checkpoint files
const ROTATING_PREFIX: &str = "checkpoint_";

/// Periodic checkpoints named `checkpoint_<round>.bin`, oldest removed first.
///
/// Other files in the directory, including `checkpoint_final.bin`, are never
/// counted or removed.
pub struct CheckpointManager {
    base_dir: PathBuf,
    interval: u64,
    max_checkpoints: usize,
    last_saved: Option<u64>,
}

impl CheckpointManager {
    /// `interval` of 0 disables periodic saving
    pub fn new(base_dir: impl Into<PathBuf>, interval: u64, max_checkpoints: usize) -> Self {
        Self {
            base_dir: base_dir.into(),
            interval,
            max_checkpoints,
            last_saved: None,
        }
    }

    pub fn should_save(&self, round: u64) -> bool {
        self.interval > 0
            && round > 0
            && round % self.interval == 0
            && self.last_saved != Some(round)
    }

    pub fn checkpoint_path(&self, round: u64) -> PathBuf {
        self.base_dir
            .join(format!("{}{:08}.bin", ROTATING_PREFIX, round))
    }

    /// Save checkpoint and rotate old files
    pub fn save(&mut self, checkpoint: &Checkpoint) -> Result<PathBuf, CheckpointError> {
        std::fs::create_dir_all(&self.base_dir)?;
        let path = self.checkpoint_path(checkpoint.round);
        checkpoint.save(&path)?;
        self.last_saved = Some(checkpoint.round);

        let saved = self.rotating_checkpoints()?;
        let excess = saved.len().saturating_sub(self.max_checkpoints);
        for old in &saved[..excess] {
            log::debug!("Removing old checkpoint {:?}", old);
            std::fs::remove_file(old)?;
        }

        Ok(path)
    }

    /// Most recent periodic checkpoint
    pub fn find_latest(&self) -> Option<PathBuf> {
        self.rotating_checkpoints().ok()?.pop()
    }

    /// Periodic checkpoint files, oldest first
    fn rotating_checkpoints(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| is_rotating_name(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.path())
            .collect();
        // Names embed the zero-padded round
        paths.sort();
        Ok(paths)
    }
}

fn is_rotating_name(name: &str) -> bool {
    name.strip_prefix(ROTATING_PREFIX)
        .and_then(|rest| rest.strip_suffix(".bin"))
        .is_some_and(|round| !round.is_empty() && round.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn create_test_checkpoint() -> Checkpoint {
        let grid = Grid::from_rows(vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]]).unwrap();
        Checkpoint::new(17, 12345, grid, None)
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("bacteria_life_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let checkpoint = create_test_checkpoint();
        let path = temp_path("roundtrip.bin");

        checkpoint.save(&path).unwrap();
        let loaded = Checkpoint::load(&path).unwrap();

        assert_eq!(loaded, checkpoint);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rejects_bad_magic() {
        let path = temp_path("bad_magic.bin");
        std::fs::write(&path, b"NOPE0000").unwrap();

        assert!(matches!(
            Checkpoint::load(&path),
            Err(CheckpointError::InvalidFormat(_))
        ));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rejects_other_version() {
        let mut checkpoint = create_test_checkpoint();
        checkpoint.version = 99;
        let path = temp_path("version.bin");
        checkpoint.save(&path).unwrap();

        assert!(matches!(
            Checkpoint::load(&path),
            Err(CheckpointError::VersionMismatch {
                expected: 1,
                found: 99
            })
        ));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_checkpoint_size() {
        let size = create_test_checkpoint().size_bytes();
        assert!(size > 4);
        assert!(size < 1024);
    }

    #[test]
    fn test_rejects_oversized_dimension() {
        // Hand-encoded with the same field layout as `Checkpoint`
        #[derive(Serialize)]
        struct RawGrid {
            dimension: u64,
            cells: Vec<Cell>,
        }
        #[derive(Serialize)]
        struct RawCheckpoint {
            version: u32,
            round: u64,
            seed: u64,
            grid: RawGrid,
            halted: Option<HaltReason>,
        }

        for (dimension, cells) in [(1u64 << 32, Vec::new()), (3, vec![Cell::Alive; 4])] {
            let raw = RawCheckpoint {
                version: Checkpoint::VERSION,
                round: 1,
                seed: 1,
                grid: RawGrid { dimension, cells },
                halted: None,
            };
            let mut bytes = MAGIC.to_vec();
            bytes.extend(bincode::serialize(&raw).unwrap());

            let path = temp_path(&format!("shape_{}.bin", dimension));
            std::fs::write(&path, bytes).unwrap();

            assert!(
                matches!(
                    Checkpoint::load(&path),
                    Err(CheckpointError::InvalidFormat(_))
                ),
                "dimension {dimension}"
            );

            std::fs::remove_file(&path).ok();
        }
    }

    #[test]
    fn test_manager_schedule_and_rotation() {
        let dir = temp_path("manager");
        let mut manager = CheckpointManager::new(&dir, 5, 2);

        assert!(!manager.should_save(0));
        assert!(!manager.should_save(3));
        assert!(manager.should_save(5));

        let grid = Grid::new(3).unwrap();
        for round in [5, 10, 15] {
            let checkpoint = Checkpoint::new(round, 1, grid.clone(), None);
            manager.save(&checkpoint).unwrap();
        }
        assert!(!manager.should_save(15));

        let remaining = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(remaining, 2);
        assert_eq!(manager.find_latest(), Some(manager.checkpoint_path(15)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_manager_ignores_final_checkpoint() {
        let dir = temp_path("final");
        std::fs::create_dir_all(&dir).unwrap();
        let final_path = dir.join("checkpoint_final.bin");
        create_test_checkpoint().save(&final_path).unwrap();

        let mut manager = CheckpointManager::new(&dir, 5, 2);
        let grid = Grid::new(3).unwrap();
        for round in [5, 10, 15] {
            manager
                .save(&Checkpoint::new(round, 1, grid.clone(), None))
                .unwrap();
        }

        assert!(final_path.exists());
        assert!(!manager.checkpoint_path(5).exists());
        assert!(manager.checkpoint_path(10).exists());
        assert_eq!(manager.find_latest(), Some(manager.checkpoint_path(15)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rotating_names() {
        assert!(is_rotating_name("checkpoint_00000015.bin"));
        assert!(!is_rotating_name("checkpoint_final.bin"));
        assert!(!is_rotating_name("checkpoint_.bin"));
        assert!(!is_rotating_name("stats_history.json"));
    }

    #[test]
    fn test_manager_disabled() {
        let manager = CheckpointManager::new(temp_path("disabled"), 0, 2);
        assert!(!manager.should_save(10));
        assert_eq!(manager.find_latest(), None);
    }
}
