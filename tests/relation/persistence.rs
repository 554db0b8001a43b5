//! Close, reopen, and keep going.

use super::common::{assert_slices_are_transpose, insert_values, tiny_config};
use sigfile::{QueryPattern, Relation, RelnConfig, SigError, Strategy};
use tempfile::TempDir;

#[test]
fn test_reopen_preserves_counters_and_results() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("people");

    let mut rel = Relation::create(&name, &tiny_config(74)).unwrap();
    for i in 0..7 {
        insert_values(&mut rel, &["p", &i.to_string(), "x"]);
    }
    let before = rel.params().clone();
    rel.close().unwrap();

    let rel = Relation::open(&name).unwrap();
    assert_eq!(rel.params(), &before);
    let pattern = QueryPattern::parse("p,?,x", 3).unwrap();
    assert_eq!(rel.select(&pattern, Strategy::BitSlices).unwrap().tuples.len(), 7);
    assert_slices_are_transpose(&rel);
}

#[test]
fn test_inserts_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("r");

    let mut rel = Relation::create(&name, &tiny_config(74)).unwrap();
    insert_values(&mut rel, &["a", "1", "x"]);
    rel.close().unwrap();

    // the half-full last page is reused, not skipped
    let mut rel = Relation::open(&name).unwrap();
    assert_eq!(insert_values(&mut rel, &["a", "2", "x"]), 0);
    assert_eq!(insert_values(&mut rel, &["a", "3", "x"]), 1);
    rel.close().unwrap();

    let rel = Relation::open(&name).unwrap();
    let p = rel.params();
    assert_eq!((p.ntups, p.npages, p.npsigs), (3, 2, 2));
    assert_slices_are_transpose(&rel);
}

#[test]
fn test_names_with_dots_and_directories() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("db.v2");
    Relation::create(&name, &tiny_config(74))
        .unwrap()
        .close()
        .unwrap();

    for suffix in ["info", "data", "tsig", "psig", "bsig"] {
        assert!(dir.path().join(format!("db.v2.{suffix}")).exists(), "{suffix}");
    }
    assert!(Relation::exists(&name));
}

#[test]
fn test_header_records_custom_page_size() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("r");
    let config = RelnConfig {
        page_size: 512,
        ..tiny_config(74)
    };
    Relation::create(&name, &config).unwrap().close().unwrap();

    let rel = Relation::open(&name).unwrap();
    assert_eq!(rel.params().page_size, 512);
    assert_eq!(rel.params().tup_pp, 508 / 35);
    let data_len = std::fs::metadata(dir.path().join("r.data")).unwrap().len();
    assert_eq!(data_len, 512);
}

#[test]
fn test_stats_serialize_flat() {
    let dir = TempDir::new().unwrap();
    let rel = Relation::create(dir.path().join("r"), &tiny_config(74)).unwrap();
    let json = serde_json::to_value(rel.stats().unwrap()).unwrap();
    assert_eq!(json["nattrs"], 3);
    assert_eq!(json["tup_pp"], 2);
    assert_eq!(json["file_pages"][0], 1);
}

#[test]
fn test_reopen_after_drop_without_close_is_rejected() {
    // one tuple stays on page 0, three tuples start page 1
    for count in [1, 3] {
        let dir = TempDir::new().unwrap();
        let name = dir.path().join("r");
        let mut rel = Relation::create(&name, &tiny_config(74)).unwrap();
        for i in 0..count {
            insert_values(&mut rel, &["d", &i.to_string(), "x"]);
        }
        drop(rel);

        assert!(
            matches!(Relation::open(&name), Err(SigError::CorruptHeader { .. })),
            "{count} tuples"
        );
    }
}

#[test]
fn test_reopen_after_close_is_accepted_at_every_fill_level() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("r");
    Relation::create(&name, &tiny_config(74)).unwrap().close().unwrap();
    for i in 0..6 {
        let mut rel = Relation::open(&name).unwrap();
        insert_values(&mut rel, &["e", &i.to_string(), "x"]);
        rel.close().unwrap();
    }
    let rel = Relation::open(&name).unwrap();
    assert_eq!(rel.params().ntups, 6);
    assert_slices_are_transpose(&rel);
}
