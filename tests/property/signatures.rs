//! Codeword shape and signature soundness.

use proptest::prelude::*;
use sigfile::{codeword, superimpose, SignatureShape, WILDCARD};

fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,6}").unwrap()
}

/// Width and a weight that fits inside it.
fn shape_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..256).prop_flat_map(|m| (Just(m), 1..=m.min(16)))
}

proptest! {
    #[test]
    fn prop_codeword_has_exact_weight(value in value_strategy(), (m, k) in shape_strategy()) {
        let cw = codeword(value.as_bytes(), m, k).unwrap();
        prop_assert_eq!(cw.len(), m);
        prop_assert_eq!(cw.count_ones(), k);
    }

    #[test]
    fn prop_codeword_is_deterministic(value in value_strategy(), (m, k) in shape_strategy()) {
        prop_assert_eq!(
            codeword(value.as_bytes(), m, k).unwrap(),
            codeword(value.as_bytes(), m, k).unwrap()
        );
    }

    /// Each value's codeword is inside the signature of any tuple holding it.
    #[test]
    fn prop_signature_contains_every_codeword(
        values in prop::collection::vec(value_strategy(), 2..6),
        (m, k) in shape_strategy(),
    ) {
        let sig = superimpose(values.iter().map(String::as_str), m, k).unwrap();
        for v in &values {
            let cw = codeword(v.as_bytes(), m, k).unwrap();
            prop_assert!(cw.is_subset_of(&sig).unwrap());
        }
    }

    /// A query built from any subset of a tuple's values never excludes it.
    #[test]
    fn prop_partial_query_matches_its_tuple(
        values in prop::collection::vec(value_strategy(), 2..6),
        mask in prop::collection::vec(any::<bool>(), 6),
    ) {
        let shape = SignatureShape { tk: 4, tm: 64, pm: 128 };
        let query: Vec<&str> = values
            .iter()
            .zip(&mask)
            .map(|(v, &keep)| if keep { v.as_str() } else { WILDCARD })
            .collect();
        let values: Vec<&str> = values.iter().map(String::as_str).collect();

        let tsig = shape.tuple_signature(values.iter().copied()).unwrap();
        let qsig = shape.tuple_signature(query.iter().copied()).unwrap();
        prop_assert!(qsig.is_subset_of(&tsig).unwrap());

        let psig = shape.page_signature(values.iter().copied()).unwrap();
        let qpsig = shape.page_signature(query.iter().copied()).unwrap();
        prop_assert!(qpsig.is_subset_of(&psig).unwrap());
    }

    #[test]
    fn prop_wildcards_contribute_nothing(n in 1usize..6) {
        let sig = superimpose(std::iter::repeat(WILDCARD).take(n), 32, 4).unwrap();
        prop_assert_eq!(sig.count_ones(), 0);
    }

    #[test]
    fn prop_equal_widths_give_equal_signatures(values in prop::collection::vec(value_strategy(), 2..6)) {
        let shape = SignatureShape { tk: 3, tm: 48, pm: 48 };
        let values: Vec<&str> = values.iter().map(String::as_str).collect();
        prop_assert_eq!(
            shape.tuple_signature(values.iter().copied()).unwrap(),
            shape.page_signature(values.iter().copied()).unwrap()
        );
    }
}

#[test]
fn test_codeword_rejects_impossible_shapes() {
    assert!(codeword(b"x", 0, 1).is_err());
    assert!(codeword(b"x", 8, 0).is_err());
    assert!(codeword(b"x", 8, 9).is_err());
}
