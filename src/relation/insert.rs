// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Inserting a tuple and maintaining the three signature files.
//!
//! One insert touches every file:
//!
//! 1. data: append the tuple to the last page, or start a new page
//! 2. tsig: append the tuple signature (its own paging, independent of data)
//! 3. psig: new data page -> append a new page signature;
//!    otherwise OR the tuple into the last page signature
//! 4. bsig: for every bit of that page signature, set the data page's bit in
//!    the matching bit-slice
//!
//! Page signature `j` always describes data page `j`, so the psig file has
//! exactly as many entries as the data file has pages. Step 3 relies on that
//! count rather than on where the psig page boundaries fall.
//!
//! Everything that can be checked up front (tuple width, arity, bit-slice
//! capacity, signature shapes) is checked before the first write.

use tracing::debug;

use super::Relation;
use crate::bits::BitVector;
use crate::error::{Result, SigError};
use crate::store::{BlockFile, Page, PageId};
use crate::tuple::Tuple;

/// Grow `file` by one page, which must become page `expected`.
fn allocate_at(file: &mut BlockFile, expected: PageId) -> Result<PageId> {
    let pid = file.allocate_page()?;
    if pid != expected {
        return Err(SigError::corrupt(format!(
            "'{}' grew to page {}, header expects page {}",
            file.path().display(),
            pid,
            expected
        )));
    }
    Ok(pid)
}

/// Append `bits` to the last page of `file`, growing it when full.
fn append_bits(
    file: &mut BlockFile,
    npages: &mut usize,
    per_page: usize,
    bits: &BitVector,
) -> Result<()> {
    let mut pid = (*npages - 1) as PageId;
    let mut page = file.read_page(pid)?;
    if page.item_count() == per_page {
        pid = allocate_at(file, *npages as PageId)?;
        *npages += 1;
        page = Page::new(file.page_size());
    }
    page.push_bits(bits)?;
    file.write_page(pid, &page)
}

impl Relation {
    /// Insert `tuple` and return the data page it landed on.
    pub fn insert(&mut self, tuple: &Tuple) -> Result<PageId> {
        let p = &self.params;
        if tuple.len() != p.tupsize {
            return Err(SigError::SizeMismatch {
                expected: p.tupsize,
                actual: tuple.len(),
            });
        }
        let values = tuple.values();
        if values.len() != p.nattrs {
            return Err(SigError::malformed(format!(
                "tuple has {} attributes, relation has {}",
                values.len(),
                p.nattrs
            )));
        }

        let shape = p.shape();
        let tsig = shape.tuple_signature(values.iter().map(String::as_str))?;
        let psig = shape.page_signature(values.iter().map(String::as_str))?;

        // 1. data page
        let mut pid = (p.npages - 1) as PageId;
        let mut page = self.data.read_page(pid)?;
        let new_page_started = page.item_count() == p.tup_pp;
        if new_page_started && p.npages >= p.bm {
            return Err(SigError::capacity(format!(
                "bit-slices of {} bits cannot address data page {}",
                p.bm, p.npages
            )));
        }
        if new_page_started {
            pid = allocate_at(&mut self.data, p.npages as PageId)?;
            self.params.npages += 1;
            page = Page::new(self.params.page_size);
        }
        page.push_bytes(tuple.as_bytes())?;
        self.data.write_page(pid, &page)?;
        self.params.ntups += 1;
        let data_pid = pid;

        // 2. tuple signature
        append_bits(
            &mut self.tsig,
            &mut self.params.tsig_npages,
            self.params.tsig_pp,
            &tsig,
        )?;
        self.params.ntsigs += 1;

        // 3. page signature
        let page_sig = if self.params.npsigs < self.params.npages {
            append_bits(
                &mut self.psig,
                &mut self.params.psig_npages,
                self.params.psig_pp,
                &psig,
            )?;
            self.params.npsigs += 1;
            psig
        } else {
            self.merge_page_signature(self.params.npsigs - 1, &psig)?
        };
        debug_assert_eq!(self.params.npsigs, self.params.npages);

        // 4. bit-slices
        self.mark_page_in_slices(&page_sig, data_pid)?;

        debug!(
            page = data_pid,
            new_page = new_page_started,
            tsig_bits = tsig.count_ones(),
            psig_bits = page_sig.count_ones(),
            ntups = self.params.ntups,
            "inserted tuple"
        );
        Ok(data_pid)
    }

    /// OR `psig` into stored page signature `index` and return the result.
    fn merge_page_signature(&mut self, index: usize, psig: &BitVector) -> Result<BitVector> {
        let pid = (index / self.params.psig_pp) as PageId;
        let slot = index % self.params.psig_pp;
        let mut page = self.psig.read_page(pid)?;
        let mut current = BitVector::new(self.params.pm);
        page.get_bits(slot, &mut current)?;
        current.or_assign(psig)?;
        page.put_bits(slot, &current)?;
        self.psig.write_page(pid, &page)?;
        Ok(current)
    }

    /// Set bit `data_pid` in the bit-slice of every bit set in `page_sig`.
    ///
    /// Set bits are visited in ascending order, so slices sharing a bsig page
    /// are updated with a single read and write of that page.
    fn mark_page_in_slices(&mut self, page_sig: &BitVector, data_pid: PageId) -> Result<()> {
        let per_page = self.params.bsig_pp;
        let mut slice = BitVector::new(self.params.bm);
        let mut open: Option<(PageId, Page)> = None;

        for bit in page_sig.iter_ones() {
            let pid = (bit / per_page) as PageId;
            if open.as_ref().map(|(open_pid, _)| *open_pid) != Some(pid) {
                if let Some((old_pid, old)) = open.take() {
                    self.bsig.write_page(old_pid, &old)?;
                }
                open = Some((pid, self.bsig.read_page(pid)?));
            }
            if let Some((_, page)) = open.as_mut() {
                let slot = bit % per_page;
                page.get_bits(slot, &mut slice)?;
                slice.set(data_pid as usize)?;
                page.put_bits(slot, &slice)?;
            }
        }
        if let Some((pid, page)) = open {
            self.bsig.write_page(pid, &page)?;
        }
        Ok(())
    }
}
