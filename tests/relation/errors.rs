//! Failure modes: every error surfaces immediately and leaves state intact.

use super::common::{fresh_relation, insert_values, tiny_config};
use sigfile::{QueryPattern, Relation, RelnConfig, SigError, Strategy, Tuple};
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_open_missing_relation() {
    let dir = TempDir::new().unwrap();
    let err = Relation::open(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, SigError::NotFound { .. }));
    assert!(err.to_string().contains("absent.info"));
}

#[test]
fn test_corrupt_header_is_rejected() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("r");
    Relation::create(&name, &tiny_config(74))
        .unwrap()
        .close()
        .unwrap();

    let info = dir.path().join("r.info");
    let mut bytes = std::fs::read(&info).unwrap();
    bytes[20] ^= 0xff;
    std::fs::File::create(&info)
        .unwrap()
        .write_all(&bytes)
        .unwrap();

    assert!(matches!(
        Relation::open(&name),
        Err(SigError::CorruptHeader { .. })
    ));
}

#[test]
fn test_truncated_header_is_rejected() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("r");
    Relation::create(&name, &tiny_config(74))
        .unwrap()
        .close()
        .unwrap();
    std::fs::write(dir.path().join("r.info"), b"SIGF").unwrap();
    assert!(matches!(
        Relation::open(&name),
        Err(SigError::CorruptHeader { .. })
    ));
}

#[test]
fn test_capacity_rejected_at_create() {
    let dir = TempDir::new().unwrap();
    // 8-byte pages cannot hold a 35-byte tuple
    let config = RelnConfig {
        page_size: 8,
        ..tiny_config(74)
    };
    assert!(matches!(
        Relation::create(dir.path().join("r"), &config),
        Err(SigError::Capacity { .. })
    ));
}

#[test]
fn test_invalid_weight_rejected_at_create() {
    let dir = TempDir::new().unwrap();
    let config = RelnConfig {
        tk: 17,
        ..tiny_config(74)
    };
    assert!(matches!(
        Relation::create(dir.path().join("r"), &config),
        Err(SigError::InvalidParameter { name: "tk", .. })
    ));
}

#[test]
fn test_capacity_rejected_at_insert() {
    let (_dir, mut rel) = fresh_relation(&tiny_config(74));
    for i in 0..64 {
        insert_values(&mut rel, &["n", &i.to_string(), "v"]);
    }
    let before = rel.stats().unwrap().file_pages;
    let t = Tuple::from_values(&["n", "64", "v"], rel.params().tupsize).unwrap();
    assert!(matches!(rel.insert(&t), Err(SigError::Capacity { .. })));
    // nothing was written
    assert_eq!(rel.stats().unwrap().file_pages, before);
    assert_eq!(rel.params().ntsigs, 64);
}

#[test]
fn test_malformed_input_rejected() {
    assert!(matches!(
        Tuple::parse("a,b", 3),
        Err(SigError::MalformedTuple { .. })
    ));
    assert!(matches!(
        Tuple::from_values(&["a\0", "b", "c"], 35),
        Err(SigError::MalformedTuple { .. })
    ));
    assert!(matches!(
        Tuple::from_values(&["x".repeat(40).as_str(), "b", "c"], 35),
        Err(SigError::SizeMismatch { expected: 35, .. })
    ));
    assert!(matches!(
        QueryPattern::parse("a,?", 3),
        Err(SigError::MalformedTuple { .. })
    ));
}

#[test]
fn test_query_arity_checked_against_relation() {
    let (_dir, rel) = fresh_relation(&tiny_config(74));
    let pattern = QueryPattern::parse("a,?,?,?", 4).unwrap();
    assert!(matches!(
        rel.select(&pattern, Strategy::TupleSignatures),
        Err(SigError::MalformedTuple { .. })
    ));
}

#[test]
fn test_insert_refuses_data_file_grown_behind_its_back() {
    let (dir, mut rel) = fresh_relation(&tiny_config(74));
    insert_values(&mut rel, &["g", "0", "x"]);
    insert_values(&mut rel, &["g", "1", "x"]);

    let mut data = std::fs::OpenOptions::new()
        .append(true)
        .open(dir.path().join("rel.data"))
        .unwrap();
    data.write_all(&[0u8; 74]).unwrap();

    let t = Tuple::from_values(&["g", "2", "x"], rel.params().tupsize).unwrap();
    assert!(matches!(rel.insert(&t), Err(SigError::CorruptHeader { .. })));
    assert_eq!(rel.params().npages, 1);
    assert_eq!(rel.params().ntups, 2);
}

#[test]
fn test_failed_create_leaves_no_header() {
    let dir = TempDir::new().unwrap();
    let name = dir.path().join("r");
    // a directory where the page-signature file belongs
    std::fs::create_dir(dir.path().join("r.psig")).unwrap();

    assert!(Relation::create(&name, &tiny_config(74)).is_err());
    assert!(!Relation::exists(&name));
    assert!(!dir.path().join("r.data").exists());

    std::fs::remove_dir(dir.path().join("r.psig")).unwrap();
    Relation::create(&name, &tiny_config(74)).unwrap().close().unwrap();
    assert!(Relation::open(&name).is_ok());
}
