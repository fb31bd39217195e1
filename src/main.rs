//! Bacteria Life - CLI Entry Point
//!
//! Headless runner for the bacteria colony automaton.

use bacteria_life::checkpoint::{Checkpoint, CheckpointManager};
use bacteria_life::{benchmark, patterns, Config, HaltReason, Session};
use clap::{Parser, Subcommand};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Checkpoints kept on disk by the rotating manager
const MAX_CHECKPOINTS: usize = 10;

#[derive(Parser)]
#[command(name = "bacteria-life")]
#[command(version)]
#[command(about = "Bacteria colony cellular automaton")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new session until the colony stabilises
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Maximum number of rounds (overrides config)
        #[arg(short, long)]
        rounds: Option<u64>,

        /// Output directory for checkpoints and stats
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Start from a named pattern instead of random noise
        #[arg(short, long)]
        pattern: Option<String>,

        /// Delay between rounds in milliseconds (overrides config)
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume a session from checkpoint
    Resume {
        /// Checkpoint file to resume from
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Number of additional rounds
        #[arg(short, long, default_value = "10000")]
        rounds: u64,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of rounds
        #[arg(short, long, default_value = "1000")]
        rounds: u64,

        /// Grid dimension
        #[arg(short, long, default_value = "256")]
        dimension: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a checkpoint file
    Analyze {
        /// Checkpoint file
        checkpoint: PathBuf,
    },

    /// List the named seed patterns
    Patterns,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            rounds,
            output,
            seed,
            pattern,
            tick_ms,
            quiet,
        } => {
            let mut config = load_config(&config)?;
            if let Some(rounds) = rounds {
                config.simulation.max_rounds = rounds;
            }
            if let Some(seed) = seed {
                config.world.seed = Some(seed);
            }
            if pattern.is_some() {
                config.world.pattern = pattern;
            }
            if let Some(tick_ms) = tick_ms {
                config.simulation.tick_ms = tick_ms;
            }
            config.validate()?;

            init_logging(&config.logging.log_level);
            run_simulation(&config, output, quiet)
        }

        Commands::Resume {
            checkpoint,
            rounds,
            output,
        } => {
            init_logging("info");
            resume_simulation(checkpoint, rounds, output)
        }

        Commands::Benchmark { rounds, dimension } => {
            init_logging("info");
            run_benchmark(rounds, dimension)
        }

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { checkpoint } => analyze_checkpoint(checkpoint),

        Commands::Patterns => {
            list_patterns();
            Ok(())
        }
    }
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Config::from_file(path)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn run_simulation(
    config: &Config,
    output: PathBuf,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&output)?;

    let mut session = Session::from_config(config)?;

    println!("Starting session");
    println!(
        "  Grid size: {}x{}",
        config.world.dimension, config.world.dimension
    );
    println!("  Seed: {}", session.engine().seed());
    if let Some(pattern) = &config.world.pattern {
        println!("  Pattern: {}", pattern);
    }
    println!("  Initial population: {}", session.grid().population());
    println!("  Max rounds: {}", config.simulation.max_rounds);
    println!();

    let checkpoint_mgr = CheckpointManager::new(
        &output,
        config.logging.checkpoint_interval,
        MAX_CHECKPOINTS,
    );

    let start = Instant::now();
    let reason = drive(
        &mut session,
        config.simulation.max_rounds,
        config.logging.stats_interval,
        Duration::from_millis(config.simulation.tick_ms),
        checkpoint_mgr,
        quiet,
    )?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Session Complete ===");
    report(&session, reason, elapsed);

    let final_checkpoint = session.create_checkpoint();
    let final_path = output.join("checkpoint_final.bin");
    final_checkpoint.save(&final_path)?;
    println!("Final checkpoint: {:?}", final_path);

    let stats_path = output.join("stats_history.json");
    session
        .history()
        .save(&stats_path.to_string_lossy())?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn resume_simulation(
    checkpoint_path: PathBuf,
    rounds: u64,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading checkpoint: {:?}", checkpoint_path);

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let mut session = Session::from_checkpoint(checkpoint)?;

    println!("Resumed at round {}", session.round());
    println!("Population: {}", session.grid().population());
    println!("Running up to {} additional rounds", rounds);
    println!();

    std::fs::create_dir_all(&output)?;
    let defaults = Config::default();
    let checkpoint_mgr = CheckpointManager::new(
        &output,
        defaults.logging.checkpoint_interval,
        MAX_CHECKPOINTS,
    );

    let start = Instant::now();
    let reason = drive(
        &mut session,
        rounds,
        defaults.logging.stats_interval,
        Duration::ZERO,
        checkpoint_mgr,
        false,
    )?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Resume Complete ===");
    report(&session, reason, elapsed);

    let final_path = output.join("checkpoint_final.bin");
    session.create_checkpoint().save(&final_path)?;
    println!("Final checkpoint: {:?}", final_path);

    Ok(())
}

/// Evolve loop shared by `run` and `resume`
fn drive(
    session: &mut Session,
    max_rounds: u64,
    stats_interval: u64,
    tick: Duration,
    mut checkpoint_mgr: CheckpointManager,
    quiet: bool,
) -> Result<HaltReason, Box<dyn std::error::Error>> {
    let reason = session.run_with_callback(max_rounds, |s| {
        let round = s.round();

        if !quiet && round % stats_interval == 0 {
            println!("{}", s.stats().summary());
        }

        if checkpoint_mgr.should_save(round) {
            match checkpoint_mgr.save(&s.create_checkpoint()) {
                Ok(path) => {
                    if !quiet {
                        println!("  Checkpoint saved: {}", path.display());
                    }
                }
                Err(e) => log::error!("Checkpoint save failed: {}", e),
            }
        }

        if !tick.is_zero() {
            std::thread::sleep(tick);
        }

        ControlFlow::Continue(())
    })?;

    Ok(reason)
}

fn report(session: &Session, reason: HaltReason, elapsed: Duration) {
    let rounds_per_sec = session.round() as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!("Halted: {:?}", reason);
    if reason == HaltReason::RoundLimit {
        println!("  (no fixed point found; the colony may be oscillating)");
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rounds: {}", session.round());
    println!("Speed: {:.1} rounds/s", rounds_per_sec);
    println!("Final population: {}", session.grid().population());
}

fn run_benchmark(rounds: u64, dimension: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Bacteria Life Benchmark ===");
    println!("Rounds: {}", rounds);
    println!("Grid: {}x{}", dimension, dimension);
    println!();

    let result = benchmark(rounds, dimension)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_checkpoint(checkpoint_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Checkpoint Analysis ===");
    println!("File: {:?}", checkpoint_path);
    println!();

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let grid = &checkpoint.grid;

    println!("Round: {}", checkpoint.round);
    println!("Seed: {}", checkpoint.seed);
    println!("Grid size: {}x{}", grid.dimension(), grid.dimension());
    println!("Population: {}", grid.population());
    println!("Density: {:.3}", grid.density());
    match checkpoint.halted {
        Some(reason) => println!("Halted: {:?}", reason),
        None => println!("Halted: no"),
    }

    println!();
    println!("Checkpoint size: {} bytes", checkpoint.size_bytes());

    Ok(())
}

fn list_patterns() {
    println!("=== Seed Patterns ===");
    for pattern in patterns::PATTERNS {
        let (height, width) = pattern.extent();
        println!(
            "{:12} {}x{} ({} cells)",
            pattern.name,
            height,
            width,
            pattern.cells.len()
        );
    }
}
