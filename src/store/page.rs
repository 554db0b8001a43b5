// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory page buffer with an item count and fixed-width slots.
//!
//! ```text
//! ┌──────────────┬──────────┬──────────┬─────┬──────────────┐
//! │ nitems: u32  │ slot 0   │ slot 1   │ ... │ unused tail  │
//! └──────────────┴──────────┴──────────┴─────┴──────────────┘
//!   4 bytes LE     width      width
//! ```
//!
//! Slot width is chosen by the owning file and never changes.

use crate::bits::BitVector;
use crate::error::{Result, SigError};

/// Bytes reserved at the front of every page for the item count.
pub const PAGE_HEADER_SIZE: usize = 4;

/// Page identifier within one block file.
pub type PageId = u32;

/// A page read from (or about to be written to) a block file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    data: Vec<u8>,
}

impl Page {
    /// A zeroed page with no items.
    pub fn new(page_size: usize) -> Self {
        Self {
            data: vec![0; page_size],
        }
    }

    pub(crate) fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Number of occupied slots.
    pub fn item_count(&self) -> usize {
        u32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]]) as usize
    }

    /// Mark one more slot as occupied.
    pub fn add_item(&mut self) {
        let n = self.item_count() as u32 + 1;
        self.data[..PAGE_HEADER_SIZE].copy_from_slice(&n.to_le_bytes());
    }

    /// How many `width`-byte slots fit on a page of `page_size` bytes.
    pub fn capacity(page_size: usize, width: usize) -> usize {
        if width == 0 {
            return 0;
        }
        page_size.saturating_sub(PAGE_HEADER_SIZE) / width
    }

    /// Byte offset of `slot` for `width`-byte items.
    pub fn slot_offset(&self, slot: usize, width: usize) -> Result<usize> {
        let offset = PAGE_HEADER_SIZE + slot * width;
        if offset + width > self.data.len() {
            return Err(SigError::OutOfRange {
                index: offset + width,
                limit: self.data.len(),
            });
        }
        Ok(offset)
    }

    /// Bytes of one slot.
    pub fn slot(&self, slot: usize, width: usize) -> Result<&[u8]> {
        let offset = self.slot_offset(slot, width)?;
        Ok(&self.data[offset..offset + width])
    }

    pub fn slot_mut(&mut self, slot: usize, width: usize) -> Result<&mut [u8]> {
        let offset = self.slot_offset(slot, width)?;
        Ok(&mut self.data[offset..offset + width])
    }

    /// Append raw bytes into the next free slot.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let slot = self.item_count();
        self.slot_mut(slot, bytes.len())?.copy_from_slice(bytes);
        self.add_item();
        Ok(slot)
    }

    /// Load the bit-vector stored in `slot`.
    pub fn get_bits(&self, slot: usize, bits: &mut BitVector) -> Result<()> {
        let offset = self.slot_offset(slot, bits.byte_len())?;
        bits.read_from(&self.data, offset)
    }

    /// Store `bits` into `slot`.
    pub fn put_bits(&mut self, slot: usize, bits: &BitVector) -> Result<()> {
        let offset = self.slot_offset(slot, bits.byte_len())?;
        bits.write_to(&mut self.data, offset)
    }

    /// Append `bits` into the next free slot.
    pub fn push_bits(&mut self, bits: &BitVector) -> Result<usize> {
        let slot = self.item_count();
        self.put_bits(slot, bits)?;
        self.add_item();
        Ok(slot)
    }
}
