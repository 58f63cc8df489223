use crate::config::SolverConfig;
use crate::encoder::encode;
use crate::model::{LevelState, Move};
use crate::rules::{apply_pour, legal_moves};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use std::sync::atomic::{AtomicBool, Ordering};

/// Outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// A solved board was reached; the path is optimal.
    Solved,
    /// The whole reachable graph was explored without reaching a solved board.
    Unsolvable,
    /// A node or time budget ran out first. Proves nothing either way.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// Length of the shortest solution when `status` is `Solved`.
    pub optimal_moves: Option<u32>,
    pub moves_path: Vec<Move>,
    pub nodes_expanded: usize,
}

impl SolveResult {
    fn unsolved(status: SolveStatus, nodes_expanded: usize) -> Self {
        Self {
            status,
            optimal_moves: None,
            moves_path: Vec::new(),
            nodes_expanded,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status == SolveStatus::Solved
    }
}

/// Breadth-first search from `state` to any solved board.
///
/// `time_budget_ms == 0` means no time limit.
pub fn solve(
    state: &LevelState,
    node_budget: usize,
    time_budget_ms: u64,
    allow_sink_moves: bool,
) -> SolveResult {
    let config = SolverConfig {
        node_budget,
        time_budget_ms,
        allow_sink_moves,
    };
    Solver::new(state.clone(), config).run()
}

struct SearchNode {
    state: LevelState,
    parent: Option<usize>,
    mv: Option<Move>,
    depth: u32,
}

pub struct Solver {
    starting_state: LevelState,
    config: SolverConfig,
}

impl Solver {
    pub fn new(starting_state: LevelState, config: SolverConfig) -> Solver {
        Solver {
            starting_state: starting_state.with_moves_used(0),
            config,
        }
    }

    pub fn run(&self) -> SolveResult {
        if !self.starting_state.has_sinks() && !arrangement_exists(&self.starting_state) {
            debug!("No solved arrangement exists for this liquid, skipping search.");
            return SolveResult::unsolved(SolveStatus::Unsolvable, 0);
        }

        let deadline = (self.config.time_budget_ms > 0)
            .then(|| Instant::now() + Duration::from_millis(self.config.time_budget_ms));

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(encode(&self.starting_state));
        let mut nodes = vec![SearchNode {
            state: self.starting_state.clone(),
            parent: None,
            mv: None,
            depth: 0,
        }];
        let mut frontier = VecDeque::from([0usize]);
        let mut expanded = 0usize;

        while let Some(index) = frontier.pop_front() {
            if nodes[index].state.is_solved() {
                let depth = nodes[index].depth;
                debug!(
                    depth,
                    expanded,
                    visited = visited.len(),
                    "Solved board reached."
                );
                return SolveResult {
                    status: SolveStatus::Solved,
                    optimal_moves: Some(depth),
                    moves_path: Self::reconstruct_path(&nodes, index),
                    nodes_expanded: expanded,
                };
            }

            // Budgets are checked per expansion so cancellation latency is one node.
            if expanded >= self.config.node_budget {
                warn!(expanded, "Solver node budget exhausted.");
                return SolveResult::unsolved(SolveStatus::Exhausted, expanded);
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(expanded, "Solver time budget exhausted.");
                return SolveResult::unsolved(SolveStatus::Exhausted, expanded);
            }
            expanded += 1;

            let depth = nodes[index].depth + 1;
            let successors: Vec<(LevelState, Move)> =
                legal_moves(&nodes[index].state, self.config.allow_sink_moves)
                    .into_iter()
                    .map(|mv| apply_pour(&nodes[index].state, mv.source, mv.target))
                    .collect();
            for (state, mv) in successors {
                if visited.insert(encode(&state)) {
                    nodes.push(SearchNode {
                        state,
                        parent: Some(index),
                        mv: Some(mv),
                        depth,
                    });
                    frontier.push_back(nodes.len() - 1);
                }
            }
        }

        debug!(expanded, visited = visited.len(), "State graph exhausted without a solution.");
        SolveResult::unsolved(SolveStatus::Unsolvable, expanded)
    }

    fn reconstruct_path(nodes: &[SearchNode], mut index: usize) -> Vec<Move> {
        let mut path = Vec::new();
        while let Some(parent) = nodes[index].parent {
            if let Some(mv) = nodes[index].mv {
                path.push(mv);
            }
            index = parent;
        }
        path.reverse();
        path
    }
}

/// (capacity, bottles used) pairs that together hold one color exactly.
type Way = Vec<(usize, usize)>;

/// Whether the board's liquid could sit in some solved arrangement at all:
/// each color's units must exactly fill a disjoint set of bottles. Sinks are
/// ignored, so only meaningful for boards without them.
pub fn arrangement_exists(state: &LevelState) -> bool {
    let mut size_to_count: BTreeMap<usize, usize> = BTreeMap::new();
    for size in state.get_container_sizes() {
        if size > 0 {
            *size_to_count.entry(size).or_insert(0) += 1;
        }
    }
    let sizes: Vec<(usize, usize)> = size_to_count.iter().rev().map(|(s, c)| (*s, *c)).collect();

    let mut liquids: Vec<usize> = state
        .get_available_colors_with_count()
        .iter()
        .map(|(_, count)| *count)
        .collect();
    liquids.sort_unstable_by(|a, b| b.cmp(a));

    let mut ways_to_get_liquids: HashMap<usize, Vec<Way>> = HashMap::new();
    for &liquid in &liquids {
        if ways_to_get_liquids.contains_key(&liquid) {
            continue;
        }
        let mut ways = Vec::new();
        enumerate_ways(&sizes, liquid, &mut Vec::new(), &mut ways);
        if ways.is_empty() {
            debug!(liquid, "No bottle combination holds this liquid exactly.");
            return false;
        }
        ways_to_get_liquids.insert(liquid, ways);
    }

    let found = AtomicBool::new(false);
    recursive_is_arrangeable(&ways_to_get_liquids, size_to_count, &liquids, &found)
}

fn enumerate_ways(sizes: &[(usize, usize)], target: usize, chosen: &mut Way, out: &mut Vec<Way>) {
    if target == 0 {
        out.push(chosen.clone());
        return;
    }
    let Some((&(size, count), rest)) = sizes.split_first() else {
        return;
    };
    for used in 0..=count {
        let filled = size * used;
        if filled > target {
            break;
        }
        if used > 0 {
            chosen.push((size, used));
        }
        enumerate_ways(rest, target - filled, chosen, out);
        if used > 0 {
            chosen.pop();
        }
    }
}

fn recursive_is_arrangeable(
    ways_to_get_liquids: &HashMap<usize, Vec<Way>>,
    remaining: BTreeMap<usize, usize>,
    liquids: &[usize],
    found: &AtomicBool,
) -> bool {
    // If another branch already found an arrangement, stop.
    if found.load(Ordering::Relaxed) {
        return true;
    }
    let Some((&current, rest)) = liquids.split_first() else {
        found.store(true, Ordering::Relaxed);
        return true;
    };
    let Some(ways) = ways_to_get_liquids.get(&current) else {
        return false;
    };

    ways.par_iter().any(|way| {
        if found.load(Ordering::Relaxed) {
            return true;
        }
        let mut next = remaining.clone();
        for (size, used) in way {
            let entry = next.entry(*size).or_insert(0);
            if *entry < *used {
                return false;
            }
            *entry -= *used;
        }
        recursive_is_arrangeable(ways_to_get_liquids, next, rest, found)
    })
}
