//! Shared test utilities and fixtures.

#![allow(dead_code)]

use sigfile::{Relation, RelnConfig, Strategy, Tuple};
use tempfile::TempDir;

// Re-export canonical test utilities from sigfile::testing
pub use sigfile::testing::{load_relation, make_tuple, synthetic_rows, tiny_config};

// ============================================================================
// RELATION FIXTURES
// ============================================================================

/// A fresh relation in its own temp directory. Keep the `TempDir` alive.
pub fn fresh_relation(config: &RelnConfig) -> (TempDir, Relation) {
    let dir = TempDir::new().expect("temp dir");
    let rel = Relation::create(dir.path().join("rel"), config).expect("create relation");
    (dir, rel)
}

/// Insert `values` into `rel` and return the data page used.
pub fn insert_values(rel: &mut Relation, values: &[&str]) -> u32 {
    let tuple = Tuple::from_values(values, rel.params().tupsize).expect("encode tuple");
    rel.insert(&tuple).expect("insert")
}

// ============================================================================
// INVARIANT CHECKS
// ============================================================================

/// Bit `j` of slice `i` equals bit `i` of page signature `j`, for every pair.
pub fn assert_slices_are_transpose(rel: &Relation) {
    let p = rel.params();
    assert_eq!(p.npsigs, p.npages, "one page signature per data page");
    assert_eq!(p.nbsigs, p.pm, "one bit-slice per page-signature bit");

    let slices: Vec<_> = (0..p.pm).map(|i| rel.bit_slice(i).unwrap()).collect();
    for page in 0..p.npages {
        let psig = rel.page_signature(page).unwrap();
        for (bit, slice) in slices.iter().enumerate() {
            assert_eq!(
                psig.get(bit).unwrap(),
                slice.get(page).unwrap(),
                "psig[{page}] bit {bit} disagrees with bsig[{bit}] bit {page}"
            );
        }
    }
    for slice in &slices {
        assert!(
            slice.iter_ones().all(|page| page < p.npages),
            "bit-slice marks a page that does not exist"
        );
    }
}

/// Every page signature is the OR of its tuples' page contributions.
pub fn assert_page_signatures_cover_tuples(rel: &Relation) {
    let p = rel.params();
    let shape = rel.shape();
    for index in 0..p.ntups {
        let page = index / p.tup_pp;
        let data = rel.tuple_at(page, index % p.tup_pp).unwrap();
        let values = data.values();
        let contribution = shape
            .page_signature(values.iter().map(String::as_str))
            .unwrap();
        let psig = rel.page_signature(page).unwrap();
        assert!(contribution.is_subset_of(&psig).unwrap());
    }
}

/// Page ids selected by each strategy, in `Strategy::ALL` order.
pub fn candidates_by_strategy(rel: &Relation, query: &str) -> Vec<Vec<u32>> {
    let pattern = sigfile::QueryPattern::parse(query, rel.params().nattrs).unwrap();
    Strategy::ALL
        .iter()
        .map(|&s| rel.candidates(&pattern, s).unwrap().page_ids())
        .collect()
}
