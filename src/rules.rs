//! Move rules over whole boards.
//!
//! [`get_pour_amount`] is the single legality check used by play, replay and
//! the solver. [`apply_reverse_pour`] is its exact inverse and only used by
//! the generator to scramble solved boards.

use crate::model::{Bottle, LevelState, Move};

/// Units that would move from bottle `source` to bottle `target`; `0` when the
/// pour is illegal or either index is off the board.
pub fn get_pour_amount(state: &LevelState, source: usize, target: usize) -> usize {
    if source == target {
        return 0;
    }
    match (state.bottle(source), state.bottle(target)) {
        (Some(from), Some(to)) => from.max_pour_amount_into(to),
        _ => 0,
    }
}

fn transfer(bottles: &mut [Bottle], source: usize, target: usize, amount: usize) {
    let Some(color) = bottles[source].get_top_color() else {
        return;
    };
    bottles[source] = bottles[source].pour(amount);
    bottles[target] = bottles[target].receive(color, amount);
}

/// Pours `source` into `target`.
///
/// Returns the new state with `moves_used` advanced by one together with the
/// move. An illegal pour returns an unchanged clone and a zero-amount move.
pub fn apply_pour(state: &LevelState, source: usize, target: usize) -> (LevelState, Move) {
    let amount = get_pour_amount(state, source, target);
    let mv = Move::new(source, target, amount);
    if amount == 0 {
        return (state.clone(), mv);
    }
    let mut bottles = state.bottles().to_vec();
    transfer(&mut bottles, source, target, amount);
    let next = state
        .with_bottles(bottles)
        .with_moves_used(state.moves_used() + 1);
    (next, mv)
}

/// Every legal pour in `(source, target)` index order. Sinks are skipped as
/// targets unless `allow_sink_targets` is set.
pub fn legal_moves(state: &LevelState, allow_sink_targets: bool) -> Vec<Move> {
    let n = state.bottle_count();
    let mut moves = Vec::new();
    for source in 0..n {
        for target in 0..n {
            if !allow_sink_targets && state.bottles()[target].is_sink() {
                continue;
            }
            let amount = get_pour_amount(state, source, target);
            if amount > 0 {
                moves.push(Move::new(source, target, amount));
            }
        }
    }
    moves
}

/// Largest legal un-pour from `source` onto `target`.
pub fn get_reverse_pour_amount(state: &LevelState, source: usize, target: usize) -> usize {
    if source == target {
        return 0;
    }
    match (state.bottle(source), state.bottle(target)) {
        (Some(from), Some(to)) => from.max_reverse_pour_amount_into(to),
        _ => 0,
    }
}

/// Moves `amount` top units from `source` onto `target` such that pouring
/// `target` back into `source` restores `state`. Returns `None` if `amount`
/// is zero or exceeds [`get_reverse_pour_amount`].
pub fn apply_reverse_pour(
    state: &LevelState,
    source: usize,
    target: usize,
    amount: usize,
) -> Option<LevelState> {
    if amount == 0 || amount > get_reverse_pour_amount(state, source, target) {
        return None;
    }
    let mut bottles = state.bottles().to_vec();
    transfer(&mut bottles, source, target, amount);
    Some(state.with_bottles(bottles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::decode;

    #[test]
    fn same_index_and_out_of_range_pour_nothing() {
        let state = decode("AB../B...").unwrap();
        assert_eq!(get_pour_amount(&state, 1, 1), 0);
        assert_eq!(get_pour_amount(&state, 0, 7), 0);
        assert_eq!(get_pour_amount(&state, 7, 0), 0);
        assert_eq!(get_pour_amount(&state, 0, 1), 1);
    }

    #[test]
    fn apply_pour_counts_only_legal_moves() {
        let state = decode("AB../B.../C...").unwrap();
        let (same, mv) = apply_pour(&state, 0, 2);
        assert_eq!(mv.amount, 0);
        assert_eq!(same, state);

        let (next, mv) = apply_pour(&state, 0, 1);
        assert_eq!(mv, Move::new(0, 1, 1));
        assert_eq!(next.moves_used(), 1);
        assert_eq!(next.bottles()[0].get_text_representation(), "A...");
        assert_eq!(next.bottles()[1].get_text_representation(), "BB..");
        // The original is untouched.
        assert_eq!(state.bottles()[0].get_text_representation(), "AB..");
    }

    #[test]
    fn legal_moves_respect_sink_option() {
        let state = decode("AB../..../*....").unwrap();
        let with_sinks = legal_moves(&state, true);
        let without = legal_moves(&state, false);
        assert!(with_sinks.iter().any(|m| m.target == 2));
        assert!(without.iter().all(|m| m.target != 2));
        assert!(with_sinks.iter().all(|m| m.source != 2));
    }

    #[test]
    fn reverse_pour_is_undone_by_forward_pour() {
        let state = decode("ABBB/C.../....").unwrap();
        for source in 0..3 {
            for target in 0..3 {
                let max = get_reverse_pour_amount(&state, source, target);
                for k in 1..=max {
                    let scrambled = apply_reverse_pour(&state, source, target, k).unwrap();
                    let (restored, mv) = apply_pour(&scrambled, target, source);
                    assert_eq!(mv.amount, k);
                    assert_eq!(restored.bottles(), state.bottles());
                }
                assert!(apply_reverse_pour(&state, source, target, max + 1).is_none());
            }
        }
    }
}
