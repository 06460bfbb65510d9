//! Property-based tests for the comparator, sorter and move planner.

use std::cmp::Ordering;

use greyris_reconcile::*;
use proptest::prelude::*;

// =============================================================================
// Test helpers
// =============================================================================

/// Small alphabets so ties on each criterion are common.
fn arbitrary_key() -> impl Strategy<Value = (String, String, i64)> {
    (
        prop_oneof![
            Just("The Beatles".to_string()),
            Just("beatles".to_string()),
            Just("ABBA".to_string()),
            Just("The The".to_string()),
            "[a-dA-D ]{0,4}",
        ],
        "(19[6-9][0-9](-0[1-9])?)?",
        0i64..4,
    )
}

/// Elements with unique identities (their index) in arbitrary metadata order.
fn arbitrary_collection() -> impl Strategy<Value = Vec<Element<usize>>> {
    prop::collection::vec(arbitrary_key(), 0..40).prop_map(|keys| {
        let n = Normalizer::default();
        keys.into_iter()
            .enumerate()
            .map(|(i, (g, s, t))| Element::new(i, n.key(&g, s, t)))
            .collect()
    })
}

fn ids(elements: &[Element<usize>]) -> Vec<usize> {
    elements.iter().map(|e| e.id).collect()
}

fn replay(mut order: Vec<usize>, moves: &[MoveOp]) -> Vec<usize> {
    for mv in moves {
        let x = order.remove(mv.from);
        order.insert(mv.to, x);
    }
    order
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Sorted output is non-decreasing and a permutation of the input.
    #[test]
    fn sort_is_ordered_permutation(input in arbitrary_collection()) {
        let sorted = sort_elements(&input);
        prop_assert!(is_sorted(&sorted));

        let mut before = ids(&input);
        let mut after = ids(&sorted);
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
    }

    /// Replaying the planned moves on the initial order yields the target.
    #[test]
    fn planned_moves_converge(input in arbitrary_collection()) {
        let target = sort_elements(&input);
        let moves = plan_moves(&input, &target).unwrap();

        prop_assert!(moves.len() <= input.len().saturating_sub(1));
        prop_assert_eq!(replay(ids(&input), &moves), ids(&target));
    }

    /// Reconciling a collection onto its own order emits nothing.
    #[test]
    fn stable_input_emits_no_moves(input in arbitrary_collection()) {
        prop_assert!(plan_moves(&input, &input).unwrap().is_empty());
    }

    /// Any permutation is reachable, not just comparator output.
    #[test]
    fn arbitrary_permutation_converges(
        (initial, target) in (1usize..30).prop_flat_map(|n| {
            let base: Vec<usize> = (0..n).collect();
            (Just(base.clone()), Just(base).prop_shuffle())
        })
    ) {
        let n = Normalizer::default();
        let as_elements = |v: &[usize]| -> Vec<Element<usize>> {
            v.iter().map(|i| Element::new(*i, n.key("", "", 0))).collect()
        };
        let moves = plan_moves(&as_elements(&initial), &as_elements(&target)).unwrap();
        prop_assert_eq!(replay(initial, &moves), target);
    }

    /// Exactly one of a<b, a==b, b<a holds, and the relation is transitive.
    #[test]
    fn comparator_is_total(a in arbitrary_key(), b in arbitrary_key(), c in arbitrary_key()) {
        let n = Normalizer::default();
        let a = Element::new(0u8, n.key(&a.0, a.1, a.2));
        let b = Element::new(1u8, n.key(&b.0, b.1, b.2));
        let c = Element::new(2u8, n.key(&c.0, c.1, c.2));

        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        prop_assert_eq!(compare(&a, &a), Ordering::Equal);
        if compare(&a, &b) == Ordering::Less && compare(&b, &c) == Ordering::Less {
            prop_assert_eq!(compare(&a, &c), Ordering::Less);
        }
    }
}
