//! Headless play session: the current board, undo/redo history and assists.

use crate::config::SolverConfig;
use crate::error::Result;
use crate::level_language::{LevelDocument, PlayStep};
use crate::model::{LevelState, Move};
use crate::rules::apply_pour;
use crate::solver::Solver;

#[derive(Clone)]
struct Snapshot {
    state: LevelState,
    history: Vec<Move>,
    steps: Vec<PlayStep>,
}

pub struct GameSession {
    state: LevelState,
    starting_state: LevelState,
    history: Vec<Move>,
    /// Pours and sink conversions in play order.
    steps: Vec<PlayStep>,
    undo_enable: bool,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl GameSession {
    pub fn new(level: LevelState, undo_enable: bool) -> Self {
        let level = level.with_moves_used(0);
        Self {
            state: level.clone(),
            starting_state: level,
            history: Vec::new(),
            steps: Vec::new(),
            undo_enable,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn get_state(&self) -> &LevelState {
        &self.state
    }

    pub fn starting_state(&self) -> &LevelState {
        &self.starting_state
    }

    /// Moves played so far, in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Moves and assists so far, in order.
    pub fn steps(&self) -> &[PlayStep] {
        &self.steps
    }

    pub fn is_won(&self) -> bool {
        self.state.is_solved()
    }

    /// Out of moves without having solved the board. A zero budget means the
    /// level has no move limit.
    pub fn is_out_of_moves(&self) -> bool {
        let allowed = self.state.moves_allowed();
        allowed > 0 && self.state.moves_used() >= allowed && !self.is_won()
    }

    /// Pours `from` into `to`. A zero-amount move changes nothing, history
    /// included.
    pub fn pour(&mut self, from: usize, to: usize) -> Move {
        let (next, mv) = apply_pour(&self.state, from, to);
        if mv.is_legal() {
            self.push_undo_state();
            self.state = next;
            self.history.push(mv);
            self.steps.push(mv.into());
        }
        mv
    }

    /// Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        if !self.undo_enable {
            return false;
        }
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.snapshot());
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.undo_enable {
            return false;
        }
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.snapshot());
        self.restore(next);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.undo_enable && !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_enable && !self.redo_stack.is_empty()
    }

    /// Back to the starting board. Undoable.
    pub fn reset(&mut self) {
        self.push_undo_state();
        self.restore(Snapshot {
            state: self.starting_state.clone(),
            history: Vec::new(),
            steps: Vec::new(),
        });
    }

    /// First move of an optimal solution from the current board.
    pub fn hint(&self, config: &SolverConfig) -> Option<Move> {
        self.auto_solve(config)?.into_iter().next()
    }

    /// An optimal move sequence from the current board, if one was found
    /// within budget.
    pub fn auto_solve(&self, config: &SolverConfig) -> Option<Vec<Move>> {
        let result = Solver::new(self.state.clone(), *config).run();
        result.is_solved().then_some(result.moves_path)
    }

    /// Assist: turns bottle `index` into a sink. Does not count as a move.
    ///
    /// # Errors
    /// Fails when `index` is outside the board.
    pub fn convert_to_sink(&mut self, index: usize) -> Result<()> {
        let converted = self.state.with_sink(index)?;
        self.push_undo_state();
        self.state = converted;
        self.steps.push(PlayStep::sink_at(index));
        Ok(())
    }

    /// Everything played so far as a shareable document. Replaying it
    /// reproduces the current board.
    pub fn to_document(&self) -> LevelDocument {
        LevelDocument::from_steps(&self.starting_state, &self.steps)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            history: self.history.clone(),
            steps: self.steps.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.state = snapshot.state;
        self.history = snapshot.history;
        self.steps = snapshot.steps;
    }

    fn push_undo_state(&mut self) {
        if self.undo_enable {
            let snapshot = self.snapshot();
            self.undo_stack.push(snapshot);
            self.redo_stack.clear();
        }
    }
}
