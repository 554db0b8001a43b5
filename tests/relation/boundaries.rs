//! Page-boundary crossings in each file, alone and together.
//!
//! The data, tuple-signature and page-signature files fill at different rates.
//! Each test picks sizes so that one file crosses a page boundary while the
//! others do not, then checks the counters and the stored signatures.

use super::common::{
    assert_page_signatures_cover_tuples, assert_slices_are_transpose, fresh_relation,
    insert_values,
};
use sigfile::{QueryPattern, RelnConfig, Strategy};

fn config(page_size: usize, tm: usize, pm: usize) -> RelnConfig {
    RelnConfig {
        nattrs: 3,
        pf: 0.01,
        page_size,
        tk: 3,
        tm,
        pm,
        bm: 32,
    }
}

/// Data pages fill every 2 tuples while one tsig page holds 35.
#[test]
fn test_data_page_fills_before_tuple_signature_page() {
    let (_dir, mut rel) = fresh_relation(&config(74, 16, 16));
    assert_eq!(rel.params().tup_pp, 2);
    assert_eq!(rel.params().tsig_pp, 35);

    for i in 0..3 {
        insert_values(&mut rel, &["k", &i.to_string(), "v"]);
    }
    let p = rel.params();
    assert_eq!((p.npages, p.npsigs), (2, 2));
    assert_eq!((p.tsig_npages, p.ntsigs), (1, 3));
    assert_slices_are_transpose(&rel);
    assert_page_signatures_cover_tuples(&rel);
}

/// 40-byte tuple signatures: 3 per tsig page against 4 tuples per data page.
#[test]
fn test_tuple_signature_page_fills_before_data_page() {
    let (_dir, mut rel) = fresh_relation(&config(150, 320, 16));
    assert_eq!(rel.params().tup_pp, 4);
    assert_eq!(rel.params().tsig_pp, 3);

    for i in 0..4 {
        insert_values(&mut rel, &["k", &i.to_string(), "v"]);
    }
    let p = rel.params();
    assert_eq!((p.npages, p.npsigs, p.psig_npages), (1, 1, 1));
    assert_eq!((p.tsig_npages, p.ntsigs), (2, 4));

    // the fourth signature lives on tsig page 1 but describes data page 0
    let expected = rel.shape().tuple_signature(["k", "3", "v"]).unwrap();
    assert_eq!(rel.tuple_signature(3).unwrap(), expected);
    let pattern = QueryPattern::parse("k,3,v", 3).unwrap();
    let c = rel.candidates(&pattern, Strategy::TupleSignatures).unwrap();
    assert_eq!(c.page_ids(), vec![0]);
    assert_eq!(c.nsigpages, 2);
    assert_slices_are_transpose(&rel);
}

/// 35-byte page signatures: the psig page is full exactly when the third data
/// page begins, so the third page signature must start a new psig page.
#[test]
fn test_page_signature_page_fills_with_new_data_page() {
    let (_dir, mut rel) = fresh_relation(&config(74, 16, 280));
    let p = rel.params();
    assert_eq!((p.tup_pp, p.psig_pp), (2, 2));
    assert_eq!(p.nbsigs, 280);
    assert_eq!(p.bsig_npages, 280_usize.div_ceil(p.bsig_pp));

    let pages: Vec<u32> = (0..5)
        .map(|i| insert_values(&mut rel, &["k", &i.to_string(), "v"]))
        .collect();
    assert_eq!(pages, vec![0, 0, 1, 1, 2]);

    let p = rel.params();
    assert_eq!((p.npages, p.npsigs, p.psig_npages), (3, 3, 2));

    // page 2 holds only the last tuple, so its signature is that tuple's alone
    let expected = rel.shape().page_signature(["k", "4", "v"]).unwrap();
    assert_eq!(rel.page_signature(2).unwrap(), expected);
    assert_slices_are_transpose(&rel);
    assert_page_signatures_cover_tuples(&rel);
}

/// Every file crossing boundaries repeatedly over a longer load.
#[test]
fn test_long_load_keeps_files_in_step() {
    let (_dir, mut rel) = fresh_relation(&config(74, 16, 280));
    for i in 0..40 {
        insert_values(&mut rel, &[&format!("a{}", i % 5), &i.to_string(), "v"]);
    }
    let p = rel.params();
    assert_eq!(p.ntups, 40);
    assert_eq!(p.npages, 20);
    assert_eq!(p.npsigs, 20);
    assert_eq!(p.psig_npages, 10);
    assert_eq!(p.ntsigs, 40);
    assert_eq!(p.tsig_npages, 2);

    let stats = rel.stats().unwrap();
    assert_eq!(
        stats.file_pages,
        [p.npages, p.tsig_npages, p.psig_npages, p.bsig_npages]
    );
    assert_slices_are_transpose(&rel);
    assert_page_signatures_cover_tuples(&rel);
}
