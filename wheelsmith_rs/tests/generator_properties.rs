use std::collections::HashSet;

use wheelsmith_rs::combinator::{combination_count, predicted_count};
use wheelsmith_rs::{WheelError, generate_combinations};

#[test]
fn scenario_all_triples_of_five() {
    let combos = generate_combinations(&[1, 2, 3, 4, 5], 3, &[]).unwrap();
    let expected: Vec<Vec<i64>> = vec![
        vec![1, 2, 3],
        vec![1, 2, 4],
        vec![1, 2, 5],
        vec![1, 3, 4],
        vec![1, 3, 5],
        vec![1, 4, 5],
        vec![2, 3, 4],
        vec![2, 3, 5],
        vec![2, 4, 5],
        vec![3, 4, 5],
    ];
    assert_eq!(combos, expected);
}

#[test]
fn lottery_sized_pool_with_fixed_numbers() {
    let pool: Vec<i64> = (1..=20).collect();
    let fixed = [7, 13];
    let combos = generate_combinations(&pool, 5, &fixed).unwrap();

    assert_eq!(combos.len() as u128, combination_count(18, 3));
    assert_eq!(combos.len() as u128, predicted_count(20, 5, 2));

    let unique: HashSet<&Vec<i64>> = combos.iter().collect();
    assert_eq!(unique.len(), combos.len());
    for combo in &combos {
        assert_eq!(combo.len(), 5);
        assert!(combo.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(fixed.iter().all(|value| combo.contains(value)));
        assert!(combo.iter().all(|value| pool.contains(value)));
    }
}

#[test]
fn generation_is_deterministic() {
    let pool = [31, 4, 15, 9, 26, 5, 35];
    let first = generate_combinations(&pool, 4, &[9]).unwrap();
    let second = generate_combinations(&pool, 4, &[9]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn negative_numbers_sort_numerically() {
    let combos = generate_combinations(&[-3, 10, 0, -20], 2, &[]).unwrap();
    assert_eq!(combos.first().unwrap(), &vec![-20, -3]);
    assert_eq!(combos.last().unwrap(), &vec![0, 10]);
}

#[test]
fn error_precedence_follows_argument_checks() {
    // Pool too small is reported before fixed-number problems.
    assert!(matches!(
        generate_combinations(&[1, 2], 3, &[1, 2, 3, 4]),
        Err(WheelError::InsufficientPool { pool: 2, k: 3 })
    ));
    // Too many fixed numbers is reported before membership.
    assert!(matches!(
        generate_combinations(&[1, 2, 3, 4], 2, &[7, 8, 9]),
        Err(WheelError::FixedExceedsLength { fixed: 3, k: 2 })
    ));
}
