//! Property-based tests using proptest.
//!
//! These cover the generation and reduction invariants over random pools.

use std::collections::BTreeSet;

use proptest::prelude::*;
use wheelsmith_rs::combinator::predicted_count;
use wheelsmith_rs::reducer::target_subsets;
use wheelsmith_rs::{Combination, generate_combinations, reduce_with_guarantee};

// Strategy for a small pool of distinct numbers plus k and a fixed subset.
fn wheel_inputs() -> impl Strategy<Value = (Vec<i64>, usize, Vec<i64>)> {
    proptest::collection::btree_set(-50i64..50, 3..9).prop_flat_map(|pool| {
        let pool: Vec<i64> = pool.into_iter().collect();
        let len = pool.len();
        (Just(pool), 1..=len.min(5)).prop_flat_map(|(pool, k)| {
            let pool_for_fixed = pool.clone();
            (
                Just(pool),
                Just(k),
                proptest::sample::subsequence(pool_for_fixed, 0..=k),
            )
        })
    })
}

fn union_of_targets(selected: &[Combination], guarantee: usize) -> BTreeSet<Combination> {
    target_subsets(selected, guarantee).into_iter().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_combinations_respect_constraints((pool, k, fixed) in wheel_inputs()) {
        let combos = generate_combinations(&pool, k, &fixed).unwrap();

        prop_assert_eq!(combos.len() as u128, predicted_count(pool.len(), k, fixed.len()));
        prop_assert!(combos.windows(2).all(|pair| pair[0] < pair[1]));
        for combo in &combos {
            prop_assert_eq!(combo.len(), k);
            prop_assert!(fixed.iter().all(|value| combo.contains(value)));
            prop_assert!(combo.iter().all(|value| pool.contains(value)));
        }
    }

    #[test]
    fn full_reduction_covers_every_target(
        (pool, k, fixed) in wheel_inputs(),
        guarantee_seed in 0usize..8,
    ) {
        let full = generate_combinations(&pool, k, &fixed).unwrap();
        let guarantee = 1 + guarantee_seed % k;
        let reduction = reduce_with_guarantee(&full, guarantee, None).unwrap();

        prop_assert!(reduction.status.is_complete());
        prop_assert!(reduction.combinations.iter().all(|combo| full.contains(combo)));
        prop_assert_eq!(
            union_of_targets(&reduction.combinations, guarantee),
            union_of_targets(&full, guarantee)
        );
        prop_assert_eq!(reduction.covered_count, reduction.target_count);
    }

    #[test]
    fn capped_reduction_never_exceeds_cap(
        (pool, k, fixed) in wheel_inputs(),
        cap in 1usize..6,
    ) {
        let full = generate_combinations(&pool, k, &fixed).unwrap();
        let guarantee = (k + 1) / 2;
        let reduction = reduce_with_guarantee(&full, guarantee, Some(cap)).unwrap();

        prop_assert!(reduction.combinations.len() <= cap);
        prop_assert!(reduction.combinations.iter().all(|combo| full.contains(combo)));
    }

    #[test]
    fn guarantee_equal_to_length_keeps_content(
        (pool, k, fixed) in wheel_inputs(),
    ) {
        let full = generate_combinations(&pool, k, &fixed).unwrap();
        let reduction = reduce_with_guarantee(&full, k, None).unwrap();
        prop_assert_eq!(reduction.combinations, full);
    }
}
