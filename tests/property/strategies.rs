//! Strategy agreement and the transpose invariant after random loads.
//!
//! Small signatures (16 bits, weight 3) keep false positives frequent, so the
//! comparisons below are exercised on pages that match by accident as well as
//! pages that really hold a match.

use proptest::prelude::*;
use sigfile::{QueryPattern, Strategy as Scan};
use tempfile::TempDir;

use super::common::{assert_slices_are_transpose, load_relation, tiny_config};

fn row_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d", "e", "f"]), 3)
        .prop_map(|r| r.into_iter().map(String::from).collect())
}

/// Up to 60 rows (30 data pages, under the 32-page limit).
fn load_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(row_strategy(), 1..60)
}

fn query_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["a", "b", "c", "d", "e", "f", "?", "?"]),
        3,
    )
    .prop_map(|q| q.join(","))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_bit_slices_are_transpose_of_page_signatures(rows in load_strategy()) {
        let dir = TempDir::new().unwrap();
        let rel = load_relation(&dir.path().join("r"), &tiny_config(74), &rows).unwrap();
        assert_slices_are_transpose(&rel);
    }

    #[test]
    fn prop_candidate_strategies_are_consistent(
        rows in load_strategy(),
        query in query_strategy(),
    ) {
        let dir = TempDir::new().unwrap();
        let rel = load_relation(&dir.path().join("r"), &tiny_config(74), &rows).unwrap();
        let pattern = QueryPattern::parse(&query, 3).unwrap();

        let tuples = rel.candidates(&pattern, Scan::TupleSignatures).unwrap();
        let pages = rel.candidates(&pattern, Scan::PageSignatures).unwrap();
        let slices = rel.candidates(&pattern, Scan::BitSlices).unwrap();

        prop_assert_eq!(&pages.pages, &slices.pages);
        prop_assert!(tuples.pages.is_subset_of(&slices.pages).unwrap());
    }

    /// Verified results equal a brute-force scan, whatever the strategy.
    #[test]
    fn prop_select_equals_full_scan(
        rows in load_strategy(),
        query in query_strategy(),
    ) {
        let dir = TempDir::new().unwrap();
        let rel = load_relation(&dir.path().join("r"), &tiny_config(74), &rows).unwrap();
        let pattern = QueryPattern::parse(&query, 3).unwrap();
        let wanted: Vec<&str> = query.split(',').collect();

        let expected: Vec<String> = rows
            .iter()
            .filter(|r| r.iter().zip(&wanted).all(|(v, w)| *w == "?" || v == w))
            .map(|r| r.join(","))
            .collect();

        for scan in Scan::ALL {
            let got: Vec<String> = rel
                .select(&pattern, scan)
                .unwrap()
                .tuples
                .iter()
                .map(ToString::to_string)
                .collect();
            prop_assert_eq!(&got, &expected, "{}", scan);
        }
    }
}
