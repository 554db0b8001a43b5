// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width tuples and query patterns.
//!
//! A tuple is its attribute values joined with `,` and zero-padded to the
//! schema's tuple size. Every tuple in a relation has the same byte length,
//! which is what lets the data file pack them into fixed slots.
//!
//! A query pattern has one entry per attribute; `?` leaves that attribute
//! unconstrained.

use std::fmt;

use crate::error::{Result, SigError};

/// Attribute value meaning "any value" in a query.
pub const WILDCARD: &str = "?";

/// Attribute separator inside an encoded tuple.
pub const SEPARATOR: u8 = b',';

/// Byte width of a tuple with `nattrs` attributes.
///
/// The schema reserves 28 bytes for the first two attributes and 7 for each
/// further one. Page capacities are derived from this, so it is part of the
/// on-disk format.
pub const fn tuple_size(nattrs: usize) -> usize {
    28 + 7 * nattrs.saturating_sub(2)
}

/// One encoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    bytes: Vec<u8>,
}

impl Tuple {
    /// Encode `values` into a record exactly `width` bytes long.
    pub fn from_values<S: AsRef<str>>(values: &[S], width: usize) -> Result<Self> {
        let mut bytes = Vec::with_capacity(width);
        for (i, value) in values.iter().enumerate() {
            let value = value.as_ref();
            if value.bytes().any(|b| b == SEPARATOR || b == 0) {
                return Err(SigError::malformed(format!(
                    "attribute {} ({:?}) contains a separator or NUL byte",
                    i, value
                )));
            }
            if i > 0 {
                bytes.push(SEPARATOR);
            }
            bytes.extend_from_slice(value.as_bytes());
        }
        if bytes.len() > width {
            return Err(SigError::SizeMismatch {
                expected: width,
                actual: bytes.len(),
            });
        }
        bytes.resize(width, 0);
        Ok(Self { bytes })
    }

    /// Parse a comma-separated line into a tuple of `nattrs` attributes.
    pub fn parse(line: &str, nattrs: usize) -> Result<Self> {
        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        if values.len() != nattrs {
            return Err(SigError::malformed(format!(
                "expected {} attributes, got {} in {:?}",
                nattrs,
                values.len(),
                line
            )));
        }
        Self::from_values(&values, tuple_size(nattrs))
    }

    /// Wrap an already-encoded record. Width is checked on insert.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Attribute values in order, padding stripped.
    ///
    /// Non-UTF-8 bytes are replaced, which cannot happen for tuples built by
    /// `from_values`.
    pub fn values(&self) -> Vec<String> {
        let end = self
            .bytes
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |p| p + 1);
        self.bytes[..end]
            .split(|&b| b == SEPARATOR)
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .collect()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values().join(","))
    }
}

/// A query: one optional value per attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPattern {
    values: Vec<Option<String>>,
}

impl QueryPattern {
    /// Parse `a,?,c` style text. Arity must equal `nattrs`.
    pub fn parse(text: &str, nattrs: usize) -> Result<Self> {
        let values: Vec<Option<String>> = text
            .split(',')
            .map(str::trim)
            .map(|v| (v != WILDCARD).then(|| v.to_string()))
            .collect();
        if values.len() != nattrs {
            return Err(SigError::malformed(format!(
                "query has {} attributes, relation has {}",
                values.len(),
                nattrs
            )));
        }
        Ok(Self { values })
    }

    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Values as fed to the signature generator (wildcards as `?`).
    pub fn signature_values(&self) -> impl Iterator<Item = &str> + '_ {
        self.values
            .iter()
            .map(|v| v.as_deref().unwrap_or(WILDCARD))
    }

    /// Exact check against a stored tuple.
    pub fn matches(&self, tuple: &Tuple) -> bool {
        let values = tuple.values();
        values.len() == self.values.len()
            && self
                .values
                .iter()
                .zip(&values)
                .all(|(want, have)| want.as_ref().map_or(true, |w| w == have))
    }
}

impl fmt::Display for QueryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.signature_values().collect();
        write!(f, "{}", parts.join(","))
    }
}
