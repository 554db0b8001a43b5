// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Candidate page generators.
//!
//! Each scan turns a query signature into a bitmap over data pages. A clear
//! bit means the page cannot hold a match; a set bit means it might.
//!
//! | Scan                    | Reads                          | Cost grows with     |
//! |-------------------------|--------------------------------|---------------------|
//! | `scan_tuple_signatures` | every tuple signature          | tuples stored       |
//! | `scan_page_signatures`  | every page signature           | data pages          |
//! | `scan_bit_slices`       | one slice per set query bit    | query weight        |
//!
//! The page-signature scan and the bit-slice scan read the same matrix, one by
//! rows and one by columns, so they always agree. When `tm == pm` a tuple
//! signature is exactly its tuple's contribution to the page signature, and the
//! tuple-signature scan can only select a subset of their pages.

use tracing::debug;

use crate::bits::BitVector;
use crate::error::{Result, SigError};
use crate::relation::Relation;
use crate::store::PageId;

/// Candidate pages plus the work it took to find them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    /// Bit `j` set means data page `j` may contain a match. `bm` bits wide.
    pub pages: BitVector,
    /// Signatures (or slices) examined.
    pub nsigs: usize,
    /// Signature-file pages read.
    pub nsigpages: usize,
}

impl Candidates {
    /// Candidate page ids in ascending order.
    pub fn page_ids(&self) -> Vec<PageId> {
        self.pages.iter_ones().map(|p| p as PageId).collect()
    }

    pub fn count(&self) -> usize {
        self.pages.count_ones()
    }
}

fn check_width(qsig: &BitVector, bits: usize) -> Result<()> {
    if qsig.len() != bits {
        return Err(SigError::SizeMismatch {
            expected: bits.div_ceil(8),
            actual: qsig.byte_len(),
        });
    }
    Ok(())
}

/// Linear scan of tuple signatures. `qsig` must be `tm` bits wide.
pub fn scan_tuple_signatures(rel: &Relation, qsig: &BitVector) -> Result<Candidates> {
    let p = rel.params();
    check_width(qsig, p.tm)?;
    let mut pages = BitVector::new(p.bm);
    let mut tsig = BitVector::new(p.tm);
    let mut nsigs = 0;

    for pid in 0..p.tsig_npages {
        let page = rel.tsig.read_page(pid as PageId)?;
        for slot in 0..page.item_count() {
            page.get_bits(slot, &mut tsig)?;
            if qsig.is_subset_of(&tsig)? {
                let tuple_index = pid * p.tsig_pp + slot;
                pages.set(tuple_index / p.tup_pp)?;
            }
        }
        nsigs += page.item_count();
    }

    debug!(
        nsigs,
        nsigpages = p.tsig_npages,
        candidates = pages.count_ones(),
        "tuple signature scan"
    );
    Ok(Candidates {
        pages,
        nsigs,
        nsigpages: p.tsig_npages,
    })
}

/// Linear scan of page signatures. `qsig` must be `pm` bits wide.
pub fn scan_page_signatures(rel: &Relation, qsig: &BitVector) -> Result<Candidates> {
    let p = rel.params();
    check_width(qsig, p.pm)?;
    let mut pages = BitVector::new(p.bm);
    let mut psig = BitVector::new(p.pm);
    let mut nsigs = 0;

    for pid in 0..p.psig_npages {
        let page = rel.psig.read_page(pid as PageId)?;
        for slot in 0..page.item_count() {
            page.get_bits(slot, &mut psig)?;
            if qsig.is_subset_of(&psig)? {
                pages.set(pid * p.psig_pp + slot)?;
            }
        }
        nsigs += page.item_count();
    }

    debug!(
        nsigs,
        nsigpages = p.psig_npages,
        candidates = pages.count_ones(),
        "page signature scan"
    );
    Ok(Candidates {
        pages,
        nsigs,
        nsigpages: p.psig_npages,
    })
}

/// Bit-sliced intersection. `qsig` must be `pm` bits wide.
///
/// Starts with every existing data page as a candidate and ANDs in the slice
/// of each bit the query sets. Bits the query leaves clear are never read.
pub fn scan_bit_slices(rel: &Relation, qsig: &BitVector) -> Result<Candidates> {
    let p = rel.params();
    check_width(qsig, p.pm)?;
    let mut pages = BitVector::new(p.bm);
    for page in 0..p.npages {
        pages.set(page)?;
    }

    let mut slice = BitVector::new(p.bm);
    let mut current: Option<(PageId, crate::store::Page)> = None;
    let mut nsigs = 0;
    let mut nsigpages = 0;

    for bit in qsig.iter_ones() {
        let pid = (bit / p.bsig_pp) as PageId;
        if current.as_ref().map(|(open_pid, _)| *open_pid) != Some(pid) {
            current = Some((pid, rel.bsig.read_page(pid)?));
            nsigpages += 1;
        }
        if let Some((_, page)) = current.as_ref() {
            page.get_bits(bit % p.bsig_pp, &mut slice)?;
            pages.and_assign(&slice)?;
        }
        nsigs += 1;
    }

    debug!(
        nsigs,
        nsigpages,
        candidates = pages.count_ones(),
        "bit-slice scan"
    );
    Ok(Candidates {
        pages,
        nsigs,
        nsigpages,
    })
}
