//! Shareable level documents.
//!
//! A document is a few `key: value` lines:
//!
//! ```text
//! # comments and blank lines are ignored
//! level: 7
//! seed: 10991
//! board: AB../BA../....
//! moves: 0,0>0,2 *0,1 0,1>0,0
//! ```
//!
//! `level` and `board` are required. Steps name bottles by their position in
//! a grid of [`GRID_COLUMNS`] columns: `row,col>row,col` is a pour and
//! `*row,col` turns that bottle into a sink. The `moves` key may repeat; its
//! lists are concatenated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::encoder::{decode, encode_bottles};
use crate::error::{EngineError, ParseError, Result};
use crate::model::{Bottle, LevelState, Move, SINK_MARKER};
use crate::rules::apply_pour;

/// Bottles per grid row.
pub const GRID_COLUMNS: usize = 3;

/// `(row, col)` of bottle `index` in the grid.
pub fn grid_position(index: usize) -> (usize, usize) {
    (index / GRID_COLUMNS, index % GRID_COLUMNS)
}

/// A recorded pour in grid coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridMove {
    pub from_row: usize,
    pub from_col: usize,
    pub to_row: usize,
    pub to_col: usize,
}

impl GridMove {
    pub fn from_indices(source: usize, target: usize) -> Self {
        let (from_row, from_col) = grid_position(source);
        let (to_row, to_col) = grid_position(target);
        Self {
            from_row,
            from_col,
            to_row,
            to_col,
        }
    }

    /// Bottle index of the source; `None` if the row is too large to index.
    pub fn source_index(&self) -> Option<usize> {
        grid_index(self.from_row, self.from_col)
    }

    pub fn target_index(&self) -> Option<usize> {
        grid_index(self.to_row, self.to_col)
    }

    fn parse(token: &str, line: usize) -> std::result::Result<Self, ParseError> {
        let (from, to) = token
            .split_once('>')
            .ok_or_else(|| malformed(token, line))?;
        let (from_row, from_col) = parse_cell(from, token, line)?;
        let (to_row, to_col) = parse_cell(to, token, line)?;
        Ok(Self {
            from_row,
            from_col,
            to_row,
            to_col,
        })
    }
}

fn malformed(token: &str, line: usize) -> ParseError {
    ParseError::new(
        line,
        format!("malformed step '{token}', expected row,col>row,col or *row,col"),
    )
}

/// Parses `row,col`, rejecting columns outside the grid and rows whose bottle
/// index would not fit in a `usize`.
fn parse_cell(
    text: &str,
    token: &str,
    line: usize,
) -> std::result::Result<(usize, usize), ParseError> {
    let (row, col) = text.split_once(',').ok_or_else(|| malformed(token, line))?;
    let row: usize = row.trim().parse().map_err(|_| malformed(token, line))?;
    let col: usize = col.trim().parse().map_err(|_| malformed(token, line))?;
    if col >= GRID_COLUMNS {
        return Err(ParseError::new(
            line,
            format!("column {col} in '{token}' exceeds grid width {GRID_COLUMNS}"),
        ));
    }
    if grid_index(row, col).is_none() {
        return Err(ParseError::new(
            line,
            format!("row {row} in '{token}' is out of range"),
        ));
    }
    Ok((row, col))
}

fn grid_index(row: usize, col: usize) -> Option<usize> {
    row.checked_mul(GRID_COLUMNS)?.checked_add(col)
}

impl From<Move> for GridMove {
    fn from(mv: Move) -> Self {
        Self::from_indices(mv.source, mv.target)
    }
}

impl fmt::Display for GridMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}>{},{}",
            self.from_row, self.from_col, self.to_row, self.to_col
        )
    }
}

/// One recorded action: a pour, or the sink-conversion assist.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayStep {
    Pour(GridMove),
    Sink { row: usize, col: usize },
}

impl PlayStep {
    pub fn sink_at(index: usize) -> Self {
        let (row, col) = grid_position(index);
        PlayStep::Sink { row, col }
    }

    fn parse(token: &str, line: usize) -> std::result::Result<Self, ParseError> {
        match token.strip_prefix(SINK_MARKER) {
            Some(cell) => {
                let (row, col) = parse_cell(cell, token, line)?;
                Ok(PlayStep::Sink { row, col })
            }
            None => GridMove::parse(token, line).map(PlayStep::Pour),
        }
    }
}

impl From<Move> for PlayStep {
    fn from(mv: Move) -> Self {
        PlayStep::Pour(mv.into())
    }
}

impl fmt::Display for PlayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayStep::Pour(mv) => write!(f, "{mv}"),
            PlayStep::Sink { row, col } => write!(f, "{SINK_MARKER}{row},{col}"),
        }
    }
}

/// Level index, starting board and an ordered list of steps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDocument {
    pub level_index: u32,
    pub seed: Option<u64>,
    pub bottles: Vec<Bottle>,
    pub moves: Vec<PlayStep>,
}

impl LevelDocument {
    /// A document for `start` with `moves` already played from it.
    pub fn from_play(start: &LevelState, moves: &[Move]) -> Self {
        let steps: Vec<PlayStep> = moves.iter().copied().map(PlayStep::from).collect();
        Self::from_steps(start, &steps)
    }

    /// A document for `start` with `steps` already played from it.
    pub fn from_steps(start: &LevelState, steps: &[PlayStep]) -> Self {
        Self {
            level_index: start.level_index(),
            seed: Some(start.seed()),
            bottles: start.bottles().to_vec(),
            moves: steps.to_vec(),
        }
    }

    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Parses a document. Never panics; every failure names its line.
    pub fn try_parse(text: &str) -> std::result::Result<Self, ParseError> {
        let mut level_index = None;
        let mut seed = None;
        let mut bottles = None;
        let mut moves = Vec::new();
        let mut last_line = 0;

        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            last_line = line;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let (key, value) = content.split_once(':').ok_or_else(|| {
                ParseError::new(line, format!("expected 'key: value', got '{content}'"))
            })?;
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "level" => {
                    if level_index.is_some() {
                        return Err(ParseError::new(line, "duplicate 'level'"));
                    }
                    let parsed = value.parse::<u32>().map_err(|_| {
                        ParseError::new(line, format!("invalid level index '{value}'"))
                    })?;
                    level_index = Some(parsed);
                }
                "seed" => {
                    if seed.is_some() {
                        return Err(ParseError::new(line, "duplicate 'seed'"));
                    }
                    let parsed = value
                        .parse::<u64>()
                        .map_err(|_| ParseError::new(line, format!("invalid seed '{value}'")))?;
                    seed = Some(parsed);
                }
                "board" => {
                    if bottles.is_some() {
                        return Err(ParseError::new(line, "duplicate 'board'"));
                    }
                    let state = decode(value).map_err(|e| ParseError::new(line, e.message))?;
                    bottles = Some(state.bottles().to_vec());
                }
                "moves" => {
                    for token in value.split_whitespace() {
                        moves.push(PlayStep::parse(token, line)?);
                    }
                }
                other => {
                    return Err(ParseError::new(line, format!("unknown key '{other}'")));
                }
            }
        }

        let level_index =
            level_index.ok_or_else(|| ParseError::new(last_line, "missing 'level'"))?;
        let bottles = bottles.ok_or_else(|| ParseError::new(last_line, "missing 'board'"))?;
        Ok(Self {
            level_index,
            seed,
            bottles,
            moves,
        })
    }

    /// The starting state described by the document.
    pub fn to_level_state(&self) -> LevelState {
        LevelState::new(self.bottles.clone())
            .with_level(self.level_index, self.seed.unwrap_or(0))
    }

    /// Plays every recorded step from the start. Sink conversions do not
    /// count as moves.
    ///
    /// # Errors
    /// [`EngineError::IllegalMove`] for the first pour that moves nothing and
    /// [`EngineError::BottleIndexOutOfRange`] for a sink step off the board.
    pub fn replay(&self) -> Result<LevelState> {
        let mut state = self.to_level_state();
        let len = state.bottle_count();
        for (ordinal, step) in self.moves.iter().enumerate() {
            match step {
                PlayStep::Pour(mv) => {
                    let from = mv.source_index().unwrap_or(usize::MAX);
                    let to = mv.target_index().unwrap_or(usize::MAX);
                    let (next, applied) = apply_pour(&state, from, to);
                    if !applied.is_legal() {
                        return Err(EngineError::IllegalMove { ordinal, from, to });
                    }
                    state = next;
                }
                PlayStep::Sink { row, col } => {
                    let index = grid_index(*row, *col)
                        .ok_or(EngineError::BottleIndexOutOfRange { index: usize::MAX, len })?;
                    state = state.with_sink(index)?;
                }
            }
        }
        Ok(state)
    }
}

impl fmt::Display for LevelDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "level: {}", self.level_index)?;
        if let Some(seed) = self.seed {
            writeln!(f, "seed: {seed}")?;
        }
        writeln!(f, "board: {}", encode_bottles(&self.bottles))?;
        write!(f, "moves:")?;
        for mv in &self.moves {
            write!(f, " {mv}")?;
        }
        writeln!(f)
    }
}

impl FromStr for LevelDocument {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}
