// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.

#![doc(hidden)]

use std::path::Path;

use crate::config::RelnConfig;
use crate::error::Result;
use crate::relation::Relation;
use crate::tuple::{tuple_size, Tuple};

/// Three attributes, `tk=3`, `tm=pm=16`, `bm=32`, with the given page size.
///
/// 74-byte pages hold 2 tuples, 35 tuple or page signatures and 17 bit-slices.
pub fn tiny_config(page_size: usize) -> RelnConfig {
    RelnConfig {
        nattrs: 3,
        pf: 0.01,
        page_size,
        tk: 3,
        tm: 16,
        pm: 16,
        bm: 32,
    }
}

/// Encode `values` at the width `tuple_size` gives for their count.
pub fn make_tuple(values: &[&str]) -> Tuple {
    Tuple::from_values(values, tuple_size(values.len()))
        .unwrap_or_else(|e| panic!("bad test tuple {:?}: {}", values, e))
}

/// Create `name` with `config` and insert every row.
pub fn load_relation(name: &Path, config: &RelnConfig, rows: &[Vec<String>]) -> Result<Relation> {
    let mut rel = Relation::create(name, config)?;
    let width = rel.params().tupsize;
    for row in rows {
        rel.insert(&Tuple::from_values(row, width)?)?;
    }
    Ok(rel)
}

/// `count` rows of `nattrs` values drawn from a small alphabet, so values repeat.
pub fn synthetic_rows(count: usize, nattrs: usize) -> Vec<Vec<String>> {
    (0..count)
        .map(|i| {
            (0..nattrs)
                .map(|a| format!("v{}", (i * 7 + a * 13) % 23))
                .collect()
        })
        .collect()
}
