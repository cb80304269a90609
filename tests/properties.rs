//! Property tests for the packer.
//!
//! Inputs are whole numbers so every comparison below is exact. The packer is
//! checked against two oracles:
//! - a plain recursive search with no pruning, which defines which of several
//!   optimal assignments must be returned,
//! - a brute-force enumeration of every assignment, which defines the fewest
//!   bars possible.

use cut_packer::types::to_units;
use cut_packer::{Packer, SearchBudget};
use proptest::prelude::*;

/// Unpruned search: fitting bars in creation order, then a new bar; strict
/// improvement only, so the first optimum reached wins.
fn reference_search(items: &[u64], capacity: u64, bins: Vec<Vec<u64>>) -> Vec<Vec<u64>> {
    let Some((&item, rest)) = items.split_first() else {
        return bins;
    };

    let mut best: Option<Vec<Vec<u64>>> = None;
    for i in 0..bins.len() {
        if bins[i].iter().sum::<u64>() + item <= capacity {
            let mut next = bins.clone();
            next[i].push(item);
            let candidate = reference_search(rest, capacity, next);
            if best.as_ref().is_none_or(|b| candidate.len() < b.len()) {
                best = Some(candidate);
            }
        }
    }

    let mut next = bins;
    next.push(vec![item]);
    let candidate = reference_search(rest, capacity, next);
    match best {
        Some(b) if b.len() <= candidate.len() => b,
        _ => candidate,
    }
}

/// Fewest bars over every assignment of items to bar labels.
fn brute_force_min(items: &[u64], capacity: u64) -> usize {
    fn go(items: &[u64], capacity: u64, loads: &mut Vec<u64>, best: &mut usize) {
        let Some((&item, rest)) = items.split_first() else {
            *best = (*best).min(loads.len());
            return;
        };
        for i in 0..loads.len() {
            if loads[i] + item <= capacity {
                loads[i] += item;
                go(rest, capacity, loads, best);
                loads[i] -= item;
            }
        }
        loads.push(item);
        go(rest, capacity, loads, best);
        loads.pop();
    }

    let mut best = usize::MAX;
    go(items, capacity, &mut Vec::new(), &mut best);
    if items.is_empty() { 0 } else { best }
}

fn to_unit_bins(partition: &[Vec<f64>]) -> Vec<Vec<u64>> {
    partition
        .iter()
        .map(|bin| bin.iter().map(|&c| to_units(c)).collect())
        .collect()
}

/// Capacity, buffer and raw items, every buffered item fitting in a bar.
fn instance(max_items: usize) -> impl Strategy<Value = (f64, f64, Vec<f64>)> {
    (10u32..=40, 0u32..=3).prop_flat_map(move |(capacity, buffer)| {
        let max_item = capacity - buffer;
        (
            Just(capacity as f64),
            Just(buffer as f64),
            prop::collection::vec((1..=max_item).prop_map(|l| l as f64), 0..=max_items),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_covers_every_item_within_capacity((capacity, buffer, items) in instance(10)) {
        let packer = Packer::new(capacity, buffer);
        let sol = packer.pack(&items).unwrap();

        prop_assert_eq!(sol.bin_count(), sol.bins.len());
        for bin in &sol.bins {
            prop_assert!(!bin.cuts.is_empty());
            prop_assert!(bin.cuts.iter().sum::<f64>() <= capacity + 1e-9);
        }

        let mut placed: Vec<f64> = sol.partition().concat();
        placed.sort_by(|a, b| b.total_cmp(a));
        prop_assert_eq!(placed, packer.prepare(&items));
    }

    #[test]
    fn prop_minimal_against_brute_force((capacity, buffer, items) in instance(6)) {
        let packer = Packer::new(capacity, buffer);
        let sol = packer.pack(&items).unwrap();
        let prepared: Vec<u64> = packer.prepare(&items).into_iter().map(to_units).collect();
        prop_assert_eq!(sol.bin_count(), brute_force_min(&prepared, to_units(capacity)));
    }

    #[test]
    fn prop_matches_unpruned_search((capacity, buffer, items) in instance(8)) {
        let packer = Packer::new(capacity, buffer);
        let sol = packer.pack(&items).unwrap();
        let prepared: Vec<u64> = packer.prepare(&items).into_iter().map(to_units).collect();
        let expected = reference_search(&prepared, to_units(capacity), Vec::new());
        prop_assert_eq!(to_unit_bins(&sol.partition()), expected);
    }

    #[test]
    fn prop_deterministic_and_order_independent((capacity, buffer, items) in instance(10)) {
        let packer = Packer::new(capacity, buffer);
        let first = packer.pack(&items).unwrap();
        let again = packer.pack(&items).unwrap();
        prop_assert_eq!(first.partition(), again.partition());

        let mut reversed = items.clone();
        reversed.reverse();
        let flipped = packer.pack(&reversed).unwrap();
        prop_assert_eq!(first.partition(), flipped.partition());
    }

    #[test]
    fn prop_budget_never_returns_partial((capacity, buffer, items) in instance(10), max_nodes in 0u64..20) {
        let packer = Packer::new(capacity, buffer)
            .with_budget(SearchBudget::unbounded().with_max_nodes(max_nodes));
        match packer.pack(&items) {
            Ok(sol) => {
                let full = Packer::new(capacity, buffer).pack(&items).unwrap();
                prop_assert_eq!(sol.partition(), full.partition());
            }
            Err(err) => prop_assert!(!err.is_invalid_input()),
        }
    }
}
