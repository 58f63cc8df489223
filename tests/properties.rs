//! Property tests over randomly generated boards.

use proptest::prelude::*;
use water_sort::rules::{apply_pour, apply_reverse_pour, get_reverse_pour_amount};
use water_sort::{
    Bottle, ColorId, DeterministicRng, LevelState, ScoreCalculator, decode, encode,
    get_pour_amount,
};

fn bottle_strategy() -> impl Strategy<Value = Bottle> {
    (1usize..=4)
        .prop_flat_map(|capacity| {
            (
                Just(capacity),
                prop::collection::vec(0usize..ColorId::COUNT, 0..=capacity),
                prop::bool::weighted(0.2),
            )
        })
        .prop_map(|(capacity, colors, sink)| {
            let contents = colors
                .into_iter()
                .filter_map(ColorId::from_index)
                .collect();
            Bottle::with_contents(capacity, contents)
                .expect("contents never exceed capacity")
                .as_sink(sink)
        })
}

fn board_strategy() -> impl Strategy<Value = LevelState> {
    prop::collection::vec(bottle_strategy(), 2..6).prop_map(LevelState::new)
}

proptest! {
    #[test]
    fn pours_conserve_every_color(board in board_strategy()) {
        let before = board.color_counts();
        for source in 0..board.bottle_count() {
            for target in 0..board.bottle_count() {
                let (next, _) = apply_pour(&board, source, target);
                prop_assert_eq!(next.color_counts(), before);
            }
        }
    }

    #[test]
    fn pour_amount_is_pure(board in board_strategy(), source in 0usize..6, target in 0usize..6) {
        let snapshot = board.clone();
        let first = get_pour_amount(&board, source, target);
        let second = get_pour_amount(&board, source, target);
        prop_assert_eq!(first, second);
        prop_assert_eq!(&board, &snapshot);
    }

    #[test]
    fn sinks_never_lose_liquid(board in board_strategy()) {
        for source in 0..board.bottle_count() {
            for target in 0..board.bottle_count() {
                let (next, _) = apply_pour(&board, source, target);
                for (old, new) in board.bottles().iter().zip(next.bottles()) {
                    if old.is_sink() {
                        prop_assert!(new.get_filled_amount() >= old.get_filled_amount());
                    }
                }
            }
        }
    }

    #[test]
    fn encoding_ignores_counters(
        board in board_strategy(),
        used in 0u32..500,
        allowed in 0u32..500
    ) {
        let tagged = board
            .clone()
            .with_moves_used(used)
            .with_moves_allowed(allowed)
            .with_level(3, 9);
        prop_assert_eq!(encode(&tagged), encode(&board));
    }

    #[test]
    fn encoding_separates_different_boards(a in board_strategy(), b in board_strategy()) {
        prop_assert_eq!(encode(&a) == encode(&b), a.bottles() == b.bottles());
    }

    #[test]
    fn board_codes_decode_back(board in board_strategy()) {
        let decoded = decode(&encode(&board)).unwrap();
        prop_assert_eq!(decoded.bottles(), board.bottles());
    }

    #[test]
    fn reverse_pours_are_undone_by_pours(board in board_strategy()) {
        for source in 0..board.bottle_count() {
            for target in 0..board.bottle_count() {
                let max = get_reverse_pour_amount(&board, source, target);
                for amount in 1..=max {
                    let scrambled = apply_reverse_pour(&board, source, target, amount).unwrap();
                    let (restored, mv) = apply_pour(&scrambled, target, source);
                    prop_assert_eq!(mv.amount, amount);
                    prop_assert_eq!(restored.bottles(), board.bottles());
                }
            }
        }
    }

    #[test]
    fn award_never_rises_with_moves(optimal in 0u32..60, slack in 0u32..30, d in 0.0f64..10.0) {
        let allowed = optimal + slack;
        let exact = ScoreCalculator::award(optimal, optimal, allowed, d);
        let one = ScoreCalculator::award(optimal + 1, optimal, allowed, d);
        let two = ScoreCalculator::award(optimal + 2, optimal, allowed, d);
        prop_assert!(exact >= one && one >= two);
    }

    #[test]
    fn award_never_falls_with_difficulty(
        used in 0u32..80,
        optimal in 0u32..60,
        slack in 0u32..30,
        d in 0.0f64..10.0,
        bump in 0.0f64..5.0
    ) {
        let allowed = optimal + slack;
        prop_assert!(
            ScoreCalculator::award(used, optimal, allowed, d + bump)
                >= ScoreCalculator::award(used, optimal, allowed, d)
        );
    }

    #[test]
    fn rng_streams_reproduce(seed in any::<u64>()) {
        let mut a = DeterministicRng::new(seed);
        let mut b = DeterministicRng::new(seed);
        for _ in 0..1000 {
            prop_assert_eq!(a.next_float().to_bits(), b.next_float().to_bits());
        }
    }

    #[test]
    fn next_int_respects_bounds(seed in any::<u64>(), min in any::<i32>(), max in any::<i32>()) {
        let mut rng = DeterministicRng::new(seed);
        let v = rng.next_int(min, max);
        if max <= min {
            prop_assert_eq!(v, min);
        } else {
            prop_assert!(v >= min && v < max);
        }
    }
}
