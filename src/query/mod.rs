// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query evaluation: candidate generation, then verification.
//!
//! # Pipeline
//!
//! ```text
//! "a,?,c" ──▶ QueryPattern ──▶ query signature ──▶ scan ──▶ Candidates
//!                                                             │
//!                    Selection ◀── verify each candidate page ◀┘
//! ```
//!
//! Signatures can only rule pages out. Every candidate page is read from the
//! data file and each tuple on it is checked against the pattern, so a
//! `Selection` never contains a false positive.

mod scan;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::bits::BitVector;
use crate::error::{Result, SigError};
use crate::relation::Relation;
use crate::tuple::{QueryPattern, Tuple};

pub use scan::{scan_bit_slices, scan_page_signatures, scan_tuple_signatures, Candidates};

/// Which signature file drives candidate generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Scan every tuple signature (`t`).
    TupleSignatures,
    /// Scan every page signature (`p`).
    PageSignatures,
    /// Intersect the bit-slices of the query's set bits (`b`).
    BitSlices,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::TupleSignatures,
        Strategy::PageSignatures,
        Strategy::BitSlices,
    ];

    /// Single-letter code used on the command line.
    pub fn code(self) -> char {
        match self {
            Strategy::TupleSignatures => 't',
            Strategy::PageSignatures => 'p',
            Strategy::BitSlices => 'b',
        }
    }
}

impl FromStr for Strategy {
    type Err = SigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t" | "tuple" | "tsig" | "tuple-signatures" => Ok(Strategy::TupleSignatures),
            "p" | "page" | "psig" | "page-signatures" => Ok(Strategy::PageSignatures),
            "b" | "bits" | "bsig" | "bit-slices" => Ok(Strategy::BitSlices),
            other => Err(SigError::invalid(
                "strategy",
                format!("unknown strategy '{}' (expected t, p or b)", other),
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::TupleSignatures => "tuple-signatures",
            Strategy::PageSignatures => "page-signatures",
            Strategy::BitSlices => "bit-slices",
        };
        f.write_str(name)
    }
}

/// Cost and outcome of one `select`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    pub strategy: Strategy,
    /// Signatures (or bit-slices) examined.
    pub nsigs: usize,
    /// Signature-file pages read.
    pub nsigpages: usize,
    pub candidate_pages: usize,
    pub data_pages_read: usize,
    pub tuples_examined: usize,
    pub matches: usize,
    /// Candidate pages that held no matching tuple.
    pub false_positive_pages: usize,
}

/// Result of a verified query.
#[derive(Debug, Clone)]
pub struct Selection {
    pub tuples: Vec<Tuple>,
    pub candidates: Candidates,
    pub stats: QueryStats,
}

impl Relation {
    /// Query signature at the width the strategy scans.
    pub fn query_signature(&self, pattern: &QueryPattern, strategy: Strategy) -> Result<BitVector> {
        self.check_arity(pattern)?;
        let shape = self.shape();
        match strategy {
            Strategy::TupleSignatures => shape.tuple_signature(pattern.signature_values()),
            Strategy::PageSignatures | Strategy::BitSlices => {
                shape.page_signature(pattern.signature_values())
            }
        }
    }

    /// Candidate pages for `pattern`, unverified.
    pub fn candidates(&self, pattern: &QueryPattern, strategy: Strategy) -> Result<Candidates> {
        let qsig = self.query_signature(pattern, strategy)?;
        match strategy {
            Strategy::TupleSignatures => scan_tuple_signatures(self, &qsig),
            Strategy::PageSignatures => scan_page_signatures(self, &qsig),
            Strategy::BitSlices => scan_bit_slices(self, &qsig),
        }
    }

    /// Run `pattern` and return only the tuples that really match.
    pub fn select(&self, pattern: &QueryPattern, strategy: Strategy) -> Result<Selection> {
        let candidates = self.candidates(pattern, strategy)?;
        let p = self.params();

        let mut tuples = Vec::new();
        let mut tuples_examined = 0;
        let mut data_pages_read = 0;
        let mut false_positive_pages = 0;

        for pid in candidates.page_ids() {
            let page = self.data.read_page(pid)?;
            data_pages_read += 1;
            let before = tuples.len();
            for slot in 0..page.item_count() {
                let tuple = Tuple::from_bytes(page.slot(slot, p.tupsize)?.to_vec());
                tuples_examined += 1;
                if pattern.matches(&tuple) {
                    tuples.push(tuple);
                }
            }
            if tuples.len() == before {
                false_positive_pages += 1;
            }
        }

        let stats = QueryStats {
            strategy,
            nsigs: candidates.nsigs,
            nsigpages: candidates.nsigpages,
            candidate_pages: candidates.count(),
            data_pages_read,
            tuples_examined,
            matches: tuples.len(),
            false_positive_pages,
        };
        debug!(
            query = %pattern,
            %strategy,
            candidates = stats.candidate_pages,
            matches = stats.matches,
            false_positives = stats.false_positive_pages,
            "select"
        );
        Ok(Selection {
            tuples,
            candidates,
            stats,
        })
    }

    fn check_arity(&self, pattern: &QueryPattern) -> Result<()> {
        let nattrs = self.params().nattrs;
        if pattern.arity() != nattrs {
            return Err(SigError::malformed(format!(
                "query has {} attributes, relation has {}",
                pattern.arity(),
                nattrs
            )));
        }
        Ok(())
    }
}
