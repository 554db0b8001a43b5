// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-length bit-strings.
//!
//! Every signature in the system is a `BitVector`: codewords, tuple signatures,
//! page signatures, bit-slices and the page bitmaps queries return. The layout
//! is the one stored on disk, so a vector can be copied straight into a page
//! slot and back.
//!
//! ```text
//! bit i  ->  bytes[i / 8], mask 1 << (i % 8)
//!
//! byte:      0          1        ...   n-1
//! bits:  7 ...... 0  15 ..... 8        (LSB of the vector is bit 0 of byte 0)
//! ```
//!
//! Bits past `nbits` in the last byte are always zero. Bulk operations mask
//! them off so equality and popcount never see stray bits.

use std::fmt;

use crate::error::{Result, SigError};

/// A fixed-length, byte-packed bit-string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    nbits: usize,
    bytes: Vec<u8>,
}

impl BitVector {
    /// Create a zeroed vector holding `nbits` bits.
    pub fn new(nbits: usize) -> Self {
        Self {
            nbits,
            bytes: vec![0; nbits.div_ceil(8)],
        }
    }

    /// Create a vector with every bit in `0..nbits` set.
    pub fn ones(nbits: usize) -> Self {
        let mut bits = Self::new(nbits);
        bits.set_all();
        bits
    }

    /// Number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.nbits
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Number of bytes of storage (and of on-disk slot width).
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Raw storage, LSB-first.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn check(&self, pos: usize) -> Result<()> {
        if pos >= self.nbits {
            return Err(SigError::OutOfRange {
                index: pos,
                limit: self.nbits,
            });
        }
        Ok(())
    }

    /// Is bit `pos` set?
    pub fn get(&self, pos: usize) -> Result<bool> {
        self.check(pos)?;
        Ok(self.bytes[pos / 8] & (1 << (pos % 8)) != 0)
    }

    pub fn set(&mut self, pos: usize) -> Result<()> {
        self.check(pos)?;
        self.bytes[pos / 8] |= 1 << (pos % 8);
        Ok(())
    }

    pub fn clear(&mut self, pos: usize) -> Result<()> {
        self.check(pos)?;
        self.bytes[pos / 8] &= !(1 << (pos % 8));
        Ok(())
    }

    /// Set every bit in `0..len()`.
    pub fn set_all(&mut self) {
        self.bytes.fill(0xFF);
        self.mask_tail();
    }

    pub fn clear_all(&mut self) {
        self.bytes.fill(0);
    }

    /// Zero the unused high bits of the final byte.
    fn mask_tail(&mut self) {
        let rem = self.nbits % 8;
        if rem != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << rem) - 1;
            }
        }
    }

    fn check_same_size(&self, other: &Self) -> Result<()> {
        if self.bytes.len() != other.bytes.len() {
            return Err(SigError::SizeMismatch {
                expected: self.bytes.len(),
                actual: other.bytes.len(),
            });
        }
        Ok(())
    }

    /// `self &= other`.
    pub fn and_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_size(other)?;
        for (a, b) in self.bytes.iter_mut().zip(&other.bytes) {
            *a &= *b;
        }
        Ok(())
    }

    /// `self |= other`.
    pub fn or_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_size(other)?;
        for (a, b) in self.bytes.iter_mut().zip(&other.bytes) {
            *a |= *b;
        }
        self.mask_tail();
        Ok(())
    }

    /// True iff every bit set in `self` is also set in `other`.
    ///
    /// This is the signature match test: a query signature can only match a
    /// stored signature it is a subset of.
    pub fn is_subset_of(&self, other: &Self) -> Result<bool> {
        self.check_same_size(other)?;
        Ok(self
            .bytes
            .iter()
            .zip(&other.bytes)
            .all(|(a, b)| a & b == *a))
    }

    /// Load `byte_len()` bytes from `buf[offset..]`.
    pub fn read_from(&mut self, buf: &[u8], offset: usize) -> Result<()> {
        let end = offset + self.bytes.len();
        let src = buf.get(offset..end).ok_or(SigError::OutOfRange {
            index: end,
            limit: buf.len(),
        })?;
        self.bytes.copy_from_slice(src);
        self.mask_tail();
        Ok(())
    }

    /// Store `byte_len()` bytes into `buf[offset..]`.
    pub fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let end = offset + self.bytes.len();
        let limit = buf.len();
        let dst = buf.get_mut(offset..end).ok_or(SigError::OutOfRange {
            index: end,
            limit,
        })?;
        dst.copy_from_slice(&self.bytes);
        Ok(())
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Positions of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bytes.iter().enumerate().flat_map(|(i, &byte)| {
            (0..8)
                .filter(move |&bit| byte & (1 << bit) != 0)
                .map(move |bit| i * 8 + bit)
        })
    }
}

/// Binary rendering, most significant bit first.
impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.bytes.iter().rev() {
            write!(f, "{:08b}", byte)?;
        }
        Ok(())
    }
}
