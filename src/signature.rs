// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Superimposed coding: attribute values to sparse codewords to signatures.
//!
//! A codeword is a `width`-bit vector with exactly `weight` bits set. Positions
//! come from a PRNG seeded with a hash of the value, so the same value always
//! produces the same codeword, whether it is being inserted or queried. A
//! signature is the OR of the codewords of every constrained attribute.
//!
//! The generator is built fresh for each codeword. Nothing is shared between
//! calls.
//!
//! # Soundness
//!
//! If a record carries value `v` then `codeword(v)` is a subset of the record's
//! signature, and therefore of every page signature the record is folded into.
//! A query signature is an OR of such codewords, so a matching record can never
//! be excluded by a subset test. Extra set bits only cause false positives.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bits::BitVector;
use crate::error::{Result, SigError};
use crate::tuple::WILDCARD;

/// Seed for a value's codeword generator.
#[inline]
fn seed_for(value: &[u8]) -> u64 {
    u64::from(crc32fast::hash(value))
}

fn check_shape(width: usize, weight: usize) -> Result<()> {
    if width == 0 {
        return Err(SigError::invalid("width", "signature width must be positive"));
    }
    if weight == 0 || weight > width {
        return Err(SigError::invalid(
            "weight",
            format!("codeword weight {} must be in 1..={}", weight, width),
        ));
    }
    Ok(())
}

/// Codeword for one attribute value: `weight` distinct bits out of `width`.
pub fn codeword(value: &[u8], width: usize, weight: usize) -> Result<BitVector> {
    check_shape(width, weight)?;
    let mut cw = BitVector::new(width);
    let mut rng = StdRng::seed_from_u64(seed_for(value));
    let mut set = 0;
    while set < weight {
        let pos = rng.gen_range(0..width);
        if !cw.get(pos)? {
            cw.set(pos)?;
            set += 1;
        }
    }
    Ok(cw)
}

/// OR together the codewords of every non-wildcard value.
pub fn superimpose<'a, I>(values: I, width: usize, weight: usize) -> Result<BitVector>
where
    I: IntoIterator<Item = &'a str>,
{
    check_shape(width, weight)?;
    let mut sig = BitVector::new(width);
    for value in values {
        if value == WILDCARD {
            continue;
        }
        sig.or_assign(&codeword(value.as_bytes(), width, weight)?)?;
    }
    Ok(sig)
}

/// Signature parameters for one relation: codeword weight plus the tuple and
/// page signature widths (already rounded to whole bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureShape {
    pub tk: usize,
    pub tm: usize,
    pub pm: usize,
}

impl SignatureShape {
    /// Tuple signature, `tm` bits wide.
    pub fn tuple_signature<'a, I>(&self, values: I) -> Result<BitVector>
    where
        I: IntoIterator<Item = &'a str>,
    {
        superimpose(values, self.tm, self.tk)
    }

    /// A record's contribution to its page signature, `pm` bits wide.
    ///
    /// Uses the same generator as the tuple signature, so when `pm == tm` the
    /// two are identical.
    pub fn page_signature<'a, I>(&self, values: I) -> Result<BitVector>
    where
        I: IntoIterator<Item = &'a str>,
    {
        superimpose(values, self.pm, self.tk)
    }
}
