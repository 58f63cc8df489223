//! # Water Sort
//!
//! Deterministic puzzle engine for a liquid-sorting game. Bottles are
//! fixed-capacity stacks of colored units; a move pours the top run of one
//! bottle into another.
//!
//! Everything here is pure and reproducible from an integer seed:
//! - [`rules`] - pour legality, shared by play and search
//! - [`solver`] - breadth-first search for optimal solutions
//! - [`generator`] - seeded levels, solvable by construction
//! - [`encoder`] / [`level_language`] - board codes and shareable documents
//! - [`scoring`] - awards, attempt bookkeeping and assist prices
//! - [`rng`] - seeded random stream and 2D noise
//!
//! Rendering, audio and storage belong to the host.

#![forbid(unsafe_code)]

pub mod config;
pub mod difficulty;
pub mod encoder;
pub mod error;
pub mod gameplay;
pub mod generator;
pub mod level_language;
pub mod model;
pub mod progress;
pub mod rng;
pub mod rules;
pub mod scoring;
pub mod solver;

pub use config::{EngineConfig, GeneratorConfig, SolverConfig};
pub use difficulty::DifficultyProfile;
pub use encoder::{decode, encode};
pub use error::{EngineError, ParseError, Result};
pub use gameplay::GameSession;
pub use generator::{LevelGenerator, generate};
pub use level_language::{GridMove, LevelDocument, PlayStep};
pub use model::{Bottle, ColorId, LevelState, Move};
pub use progress::ProgressRecord;
pub use rng::DeterministicRng;
pub use rules::get_pour_amount;
pub use scoring::{ScoreCalculator, ScoreSession, StarEconomy};
pub use solver::{SolveResult, SolveStatus, solve};
