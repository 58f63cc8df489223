//! Headless water-sort tool.
//!
//! ```bash
//! # Generate level 12 from its default seed
//! water_sort generate --level 12
//!
//! # Solve a board code
//! water_sort solve "AB../BA../..../...."
//!
//! # Replay a level document and check the result
//! water_sort replay level.txt
//! ```
//!
//! Results go to stdout (text, or JSON with `--json`); logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use water_sort::level_language::LevelDocument;
use water_sort::progress::seed_for_level;
use water_sort::solver::Solver;
use water_sort::{
    DifficultyProfile, EngineConfig, EngineError, LevelGenerator, LevelState, SolveResult, decode,
    encode,
};

#[derive(Parser)]
#[command(name = "water_sort")]
#[command(about = "Generate, solve and replay water-sort levels")]
#[command(version)]
struct Cli {
    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// RON config file with solver and generator budgets
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a level
    Generate {
        /// Level index (1-based)
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// Seed; derived from the level index when omitted
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Solve a board code such as "AB../BA../...."
    Solve {
        board: String,

        /// Forbid pouring into sink bottles
        #[arg(long)]
        no_sink_moves: bool,
    },

    /// Replay a level document and report the final board
    Replay { file: PathBuf },

    /// Show the difficulty profile for a level
    Profile {
        #[arg(short, long, default_value = "1")]
        level: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let outcome = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Generate { level, seed } => cmd_generate(&config, level, seed, cli.json),
        Commands::Solve {
            board,
            no_sink_moves,
        } => cmd_solve(&config, &board, no_sink_moves, cli.json),
        Commands::Replay { file } => cmd_replay(&file, cli.json),
        Commands::Profile { level } => cmd_profile(level, cli.json),
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(EngineConfig::from_ron_str(&source)?)
}

fn cmd_generate(
    config: &EngineConfig,
    level: u32,
    seed: Option<u64>,
    json: bool,
) -> Result<(), CliError> {
    let profile = DifficultyProfile::for_level(level);
    let seed = seed.unwrap_or_else(|| seed_for_level(0, profile.level_index));
    let state = LevelGenerator::new(config.generator).generate(seed, &profile);

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }
    print!("{}", LevelDocument::from_play(&state, &[]));
    println!(
        "# optimal: {}  allowed: {}",
        state.optimal_moves(),
        state.moves_allowed()
    );
    Ok(())
}

fn cmd_solve(
    config: &EngineConfig,
    board: &str,
    no_sink_moves: bool,
    json: bool,
) -> Result<(), CliError> {
    let state = decode(board).map_err(EngineError::from)?;
    let solver_config = config
        .solver
        .with_sink_moves(config.solver.allow_sink_moves && !no_sink_moves);
    let result = Solver::new(state.clone(), solver_config).run();
    print_result(&state, &result, json)
}

fn print_result(
    state: &LevelState,
    result: &SolveResult,
    json: bool,
) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    println!("board: {}", encode(state));
    println!("status: {:?}", result.status);
    if let Some(optimal) = result.optimal_moves {
        println!("optimal: {optimal}");
        let doc = LevelDocument::from_play(state, &result.moves_path);
        let moves: Vec<String> = doc.moves.iter().map(ToString::to_string).collect();
        println!("moves: {}", moves.join(" "));
    }
    println!("expanded: {}", result.nodes_expanded);
    Ok(())
}

fn cmd_replay(file: &Path, json: bool) -> Result<(), CliError> {
    let text = std::fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let doc = LevelDocument::try_parse(&text).map_err(EngineError::from)?;
    let end = doc.replay()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&end)?);
        return Ok(());
    }
    println!("board: {}", encode(&end));
    println!("moves used: {}", end.moves_used());
    println!("solved: {}", end.is_solved());
    Ok(())
}

fn cmd_profile(level: u32, json: bool) -> Result<(), CliError> {
    let profile = DifficultyProfile::for_level(level);
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("{profile:#?}");
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
