//! Board model: colors, bottles and level states.
//!
//! All types are values. Pouring, receiving and every other transition return
//! a new value and leave the original untouched.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ParseError, Result};

/// Marker for a sink bottle in bottle codes.
pub const SINK_MARKER: char = '*';
/// Marker for an empty slot in bottle codes.
pub const EMPTY_SLOT: char = '.';

/// One of the eight liquid colors.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ColorId {
    Red,
    Blue,
    Yellow,
    Green,
    Purple,
    Orange,
    Cyan,
    Magenta,
}

impl ColorId {
    pub const COUNT: usize = 8;

    pub const ALL: [ColorId; Self::COUNT] = [
        ColorId::Red,
        ColorId::Blue,
        ColorId::Yellow,
        ColorId::Green,
        ColorId::Purple,
        ColorId::Orange,
        ColorId::Cyan,
        ColorId::Magenta,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Letter used in codes: `A` for red through `H` for magenta.
    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Inverse of [`ColorId::letter`], case-insensitive.
    pub fn from_letter(ch: char) -> Option<Self> {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let up = ch.to_ascii_uppercase();
        Self::from_index((up as u8 - b'A') as usize)
    }
}

/// A fixed-capacity stack of liquid units, stored bottom-to-top.
///
/// Occupied slots always form a contiguous prefix, so the contents are kept as
/// a plain list and the free slots are implied by the capacity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bottle {
    contents: Vec<ColorId>,
    capacity: usize,
    sink: bool,
}

impl Bottle {
    /// An empty, non-sink bottle. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            contents: Vec::with_capacity(capacity),
            capacity,
            sink: false,
        }
    }

    /// A bottle holding `contents` (bottom first).
    ///
    /// # Errors
    /// Fails for a zero capacity or when the contents exceed it.
    pub fn with_contents(capacity: usize, contents: Vec<ColorId>) -> Result<Self> {
        if capacity == 0 {
            return Err(EngineError::ZeroCapacity);
        }
        if contents.len() > capacity {
            return Err(EngineError::Overfilled {
                capacity,
                count: contents.len(),
            });
        }
        Ok(Self {
            contents,
            capacity,
            sink: false,
        })
    }

    /// A bottle filled to the brim with a single color. A zero capacity is
    /// raised to one.
    pub fn filled(capacity: usize, color: ColorId) -> Self {
        let capacity = capacity.max(1);
        Self {
            contents: vec![color; capacity],
            capacity,
            sink: false,
        }
    }

    /// Same contents, with the sink flag set to `sink`.
    #[must_use]
    pub fn as_sink(mut self, sink: bool) -> Self {
        self.sink = sink;
        self
    }

    pub fn is_sink(&self) -> bool {
        self.sink
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_filled_amount(&self) -> usize {
        self.contents.len()
    }

    pub fn get_empty_space(&self) -> usize {
        self.capacity - self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.contents.len() >= self.capacity
    }

    pub fn get_contents(&self) -> &[ColorId] {
        &self.contents
    }

    /// Every slot bottom-to-top, `None` for empty ones.
    pub fn slots(&self) -> impl Iterator<Item = Option<ColorId>> + '_ {
        (0..self.capacity).map(|i| self.contents.get(i).copied())
    }

    pub fn get_top_color(&self) -> Option<ColorId> {
        self.contents.last().copied()
    }

    /// Length of the contiguous same-color run at the top.
    pub fn get_top_run(&self) -> usize {
        let Some(top) = self.get_top_color() else {
            return 0;
        };
        self.contents.iter().rev().take_while(|c| **c == top).count()
    }

    /// Non-empty and a single color throughout.
    pub fn is_uniform(&self) -> bool {
        !self.is_empty() && self.get_top_run() == self.contents.len()
    }

    /// Full of a single color.
    pub fn is_complete(&self) -> bool {
        self.is_full() && self.is_uniform()
    }

    /// Whether this bottle is acceptable in a solved board: sinks always are,
    /// other bottles must be empty or complete.
    pub fn is_settled(&self) -> bool {
        self.sink || self.is_empty() || self.is_complete()
    }

    /// How many units a pour from `self` into `target` would move. Zero means
    /// the pour is illegal.
    ///
    /// Sinks never pour. A sink target accepts any color. Pouring a whole
    /// bottle into an empty bottle of the same capacity only relabels the two
    /// and is rejected.
    pub fn max_pour_amount_into(&self, target: &Bottle) -> usize {
        if self.sink || self.is_empty() || target.is_full() {
            return 0;
        }
        let top = self.get_top_color();
        if !target.sink && !target.is_empty() && target.get_top_color() != top {
            return 0;
        }
        let amount = self.get_top_run().min(target.get_empty_space());
        if !target.sink
            && target.is_empty()
            && amount == self.contents.len()
            && self.capacity == target.capacity
        {
            return 0;
        }
        amount
    }

    /// Largest `k` such that moving `k` top units from `self` onto `target`
    /// yields a board from which pouring `target` back into `self` is legal
    /// and moves exactly `k` units. Any `k` in `1..=max` is a valid un-pour.
    pub fn max_reverse_pour_amount_into(&self, target: &Bottle) -> usize {
        if self.sink || target.sink || self.is_empty() || target.is_full() {
            return 0;
        }
        let run = self.get_top_run();
        let whole = run == self.contents.len();
        // Leave one unit of the run behind unless the bottle empties, or the
        // forward pour would land on a different color.
        let mut max = if whole { run } else { run - 1 };
        max = max.min(target.get_empty_space());
        if target.get_top_color() == self.get_top_color() && !self.is_full() {
            // The forward pour would carry target's existing units too.
            return 0;
        }
        if target.is_empty() && whole && self.capacity == target.capacity {
            max = max.min(run - 1);
        }
        max
    }

    /// Removes up to `amount` units of the top run. Sinks are returned as-is.
    #[must_use]
    pub fn pour(&self, amount: usize) -> Bottle {
        if self.sink {
            return self.clone();
        }
        let take = amount.min(self.get_top_run());
        let mut contents = self.contents.clone();
        contents.truncate(contents.len() - take);
        Bottle {
            contents,
            capacity: self.capacity,
            sink: self.sink,
        }
    }

    /// Adds up to `amount` units of `color`, limited by free space.
    #[must_use]
    pub fn receive(&self, color: ColorId, amount: usize) -> Bottle {
        let add = amount.min(self.get_empty_space());
        let mut contents = self.contents.clone();
        contents.extend(std::iter::repeat_n(color, add));
        Bottle {
            contents,
            capacity: self.capacity,
            sink: self.sink,
        }
    }

    /// Slot letters bottom-to-top, `.` for empty slots, `*` prefix for sinks.
    pub fn get_text_representation(&self) -> String {
        let mut repr = String::with_capacity(self.capacity + 1);
        if self.sink {
            repr.push(SINK_MARKER);
        }
        for slot in self.slots() {
            repr.push(slot.map_or(EMPTY_SLOT, ColorId::letter));
        }
        repr
    }

    /// Parses [`Bottle::get_text_representation`] output.
    ///
    /// # Errors
    /// Rejects unknown letters, zero-length bottles and liquid floating above
    /// an empty slot.
    pub fn new_from_repr(repr: &str) -> std::result::Result<Self, ParseError> {
        let s = repr.trim();
        let (sink, slots) = match s.strip_prefix(SINK_MARKER) {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if slots.is_empty() {
            return Err(ParseError::new(0, format!("bottle '{repr}' has no slots")));
        }

        let mut contents = Vec::new();
        let mut capacity = 0;
        let mut seen_empty = false;
        for ch in slots.chars() {
            capacity += 1;
            if ch == EMPTY_SLOT {
                seen_empty = true;
                continue;
            }
            let color = ColorId::from_letter(ch).ok_or_else(|| {
                ParseError::new(0, format!("unknown color '{ch}' in bottle '{repr}'"))
            })?;
            if seen_empty {
                return Err(ParseError::new(
                    0,
                    format!("bottle '{repr}' has liquid above an empty slot"),
                ));
            }
            contents.push(color);
        }
        Ok(Self {
            contents,
            capacity,
            sink,
        })
    }
}

/// A single pour between two bottles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub source: usize,
    pub target: usize,
    pub amount: usize,
}

impl Move {
    pub fn new(source: usize, target: usize, amount: usize) -> Self {
        Self {
            source,
            target,
            amount,
        }
    }

    /// Whether the pour actually moved liquid.
    pub fn is_legal(&self) -> bool {
        self.amount > 0
    }
}

/// An immutable board plus its play metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    bottles: Vec<Bottle>,
    moves_used: u32,
    moves_allowed: u32,
    optimal_moves: u32,
    level_index: u32,
    seed: u64,
}

impl LevelState {
    pub fn new(bottles: Vec<Bottle>) -> Self {
        Self {
            bottles,
            moves_used: 0,
            moves_allowed: 0,
            optimal_moves: 0,
            level_index: 0,
            seed: 0,
        }
    }

    pub fn bottles(&self) -> &[Bottle] {
        &self.bottles
    }

    pub fn bottle(&self, index: usize) -> Option<&Bottle> {
        self.bottles.get(index)
    }

    pub fn bottle_count(&self) -> usize {
        self.bottles.len()
    }

    pub fn moves_used(&self) -> u32 {
        self.moves_used
    }

    pub fn moves_allowed(&self) -> u32 {
        self.moves_allowed
    }

    pub fn optimal_moves(&self) -> u32 {
        self.optimal_moves
    }

    pub fn level_index(&self) -> u32 {
        self.level_index
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn with_moves_used(mut self, moves_used: u32) -> Self {
        self.moves_used = moves_used;
        self
    }

    #[must_use]
    pub fn with_moves_allowed(mut self, moves_allowed: u32) -> Self {
        self.moves_allowed = moves_allowed;
        self
    }

    #[must_use]
    pub fn with_optimal_moves(mut self, optimal_moves: u32) -> Self {
        self.optimal_moves = optimal_moves;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level_index: u32, seed: u64) -> Self {
        self.level_index = level_index;
        self.seed = seed;
        self
    }

    /// Same metadata, different bottles.
    #[must_use]
    pub(crate) fn with_bottles(&self, bottles: Vec<Bottle>) -> Self {
        Self {
            bottles,
            ..self.clone()
        }
    }

    /// Replaces one bottle.
    ///
    /// # Errors
    /// Fails when `index` is outside the board.
    pub fn with_bottle(&self, index: usize, bottle: Bottle) -> Result<Self> {
        if index >= self.bottles.len() {
            return Err(EngineError::BottleIndexOutOfRange {
                index,
                len: self.bottles.len(),
            });
        }
        let mut bottles = self.bottles.clone();
        bottles[index] = bottle;
        Ok(self.with_bottles(bottles))
    }

    /// Turns bottle `index` into a sink, keeping its contents.
    ///
    /// # Errors
    /// Fails when `index` is outside the board.
    pub fn with_sink(&self, index: usize) -> Result<Self> {
        let bottle = self
            .bottle(index)
            .ok_or(EngineError::BottleIndexOutOfRange {
                index,
                len: self.bottles.len(),
            })?
            .clone()
            .as_sink(true);
        self.with_bottle(index, bottle)
    }

    /// Every non-sink bottle is empty or full of one color.
    pub fn is_solved(&self) -> bool {
        self.bottles.iter().all(Bottle::is_settled)
    }

    pub fn has_sinks(&self) -> bool {
        self.bottles.iter().any(Bottle::is_sink)
    }

    /// Units of each color on the board, indexed by [`ColorId::index`].
    pub fn color_counts(&self) -> [usize; ColorId::COUNT] {
        let mut counts = [0; ColorId::COUNT];
        for color in self.bottles.iter().flat_map(|b| b.get_contents()) {
            counts[color.index()] += 1;
        }
        counts
    }

    /// Colors present on the board with their unit counts.
    pub fn get_available_colors_with_count(&self) -> Vec<(ColorId, usize)> {
        self.color_counts()
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .filter_map(|(i, count)| ColorId::from_index(i).map(|c| (c, *count)))
            .collect()
    }

    pub fn get_container_sizes(&self) -> Vec<usize> {
        self.bottles.iter().map(Bottle::get_capacity).collect()
    }
}
