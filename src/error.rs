// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by every layer of the crate.
//!
//! One enum, one variant per failure kind. Nothing here is retried or swallowed:
//! the operation that detects a problem hands it straight back to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for signature-file operations.
#[derive(Error, Debug)]
pub enum SigError {
    /// Bit or byte index outside the addressed vector or buffer.
    #[error("index {index} out of range (limit {limit})")]
    OutOfRange { index: usize, limit: usize },

    /// Two bit-vectors of different byte length were combined, or a record
    /// does not have the schema's fixed width.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A configured width leaves too few slots per page, or the relation has
    /// run out of representable pages.
    #[error("capacity error: {detail}")]
    Capacity { detail: String },

    /// Relation header file does not exist.
    #[error("relation not found: '{}'", path.display())]
    NotFound { path: PathBuf },

    /// Relation header file already exists.
    #[error("relation already exists: '{}'", path.display())]
    AlreadyExists { path: PathBuf },

    /// The block store could not grow a file.
    #[error("cannot allocate page in '{}': {}", path.display(), source)]
    Allocation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A creation parameter is outside its valid domain.
    #[error("invalid parameter {name}: {detail}")]
    InvalidParameter { name: &'static str, detail: String },

    /// Header file failed magic, version or checksum validation.
    #[error("corrupt relation header: {detail}")]
    CorruptHeader { detail: String },

    /// Tuple or query text cannot be encoded for this schema.
    #[error("malformed tuple: {detail}")]
    MalformedTuple { detail: String },

    /// Underlying file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SigError {
    pub(crate) fn capacity(detail: impl Into<String>) -> Self {
        Self::Capacity {
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            detail: detail.into(),
        }
    }

    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        Self::CorruptHeader {
            detail: detail.into(),
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedTuple {
            detail: detail.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SigError>;
