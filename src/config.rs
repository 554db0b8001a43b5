// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Relation creation parameters.
//!
//! A `RelnConfig` is what a user asks for; `RelnParams` (in `relation`) is
//! what gets stored after validation and byte rounding. Configs can be written
//! by hand, loaded from JSON, or derived from a target false-positive rate.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SigError};
use crate::store::{Page, DEFAULT_PAGE_SIZE};
use crate::tuple::tuple_size;

/// Requested shape of a new relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelnConfig {
    /// Number of attributes per tuple.
    pub nattrs: usize,
    /// Target false-positive probability (recorded, used for derivation).
    pub pf: f64,
    /// Bytes per page in every file of the relation.
    pub page_size: usize,
    /// Bits set per codeword.
    pub tk: usize,
    /// Tuple signature width in bits.
    pub tm: usize,
    /// Page signature width in bits.
    pub pm: usize,
    /// Bit-slice width in bits, i.e. the maximum number of data pages.
    pub bm: usize,
}

impl Default for RelnConfig {
    fn default() -> Self {
        Self {
            nattrs: 3,
            pf: 0.001,
            page_size: DEFAULT_PAGE_SIZE,
            tk: 10,
            tm: 48,
            pm: 1256,
            bm: 1024,
        }
    }
}

impl RelnConfig {
    /// Derive signature sizes from a false-positive target.
    ///
    /// Uses the standard superimposed-coding optimum: with `n` values per
    /// signature, `m = n·ln(1/pF)/(ln 2)²` bits and `k = ln(1/pF)/ln 2` bits
    /// per codeword. Tuple signatures hold `nattrs` values; page signatures
    /// hold `nattrs` values for every tuple that fits on a page.
    pub fn from_false_positive_rate(
        nattrs: usize,
        pf: f64,
        max_pages: usize,
        page_size: usize,
    ) -> Result<Self> {
        if !(pf > 0.0 && pf < 1.0) {
            return Err(SigError::invalid("pf", format!("{} is not in (0, 1)", pf)));
        }
        if nattrs < 2 {
            return Err(SigError::invalid("nattrs", "at least 2 attributes required"));
        }
        let ln2 = std::f64::consts::LN_2;
        let log_inv = (1.0 / pf).ln();
        let tups_per_page = Page::capacity(page_size, tuple_size(nattrs)).max(1);

        let tk = (log_inv / ln2).ceil() as usize;
        let tm = (nattrs as f64 * log_inv / (ln2 * ln2)).ceil() as usize;
        let pm = ((tups_per_page * nattrs) as f64 * log_inv / (ln2 * ln2)).ceil() as usize;

        Ok(Self {
            nattrs,
            pf,
            page_size,
            tk: tk.max(1),
            tm: tm.max(tk),
            pm: pm.max(tk),
            bm: max_pages,
        })
    }

    /// Load a config from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| SigError::invalid("config", e.to_string()))
    }
}
