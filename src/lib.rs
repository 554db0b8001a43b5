// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Signature-file indexing with superimposed coding and bit-slices.
//!
//! A relation stores fixed-width tuples in a paged data file and keeps three
//! signature files beside it. Queries use the signatures to rule out data pages
//! before reading any of them.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌──────────────┐    ┌──────────────────────┐
//! │  tuple.rs  │───▶│ signature.rs │───▶│      relation/       │
//! │  (Tuple,   │    │  (codeword,  │    │ (create, open,       │
//! │ QueryPat.) │    │  superimpose)│    │  insert, stats)      │
//! └────────────┘    └──────────────┘    └──────────────────────┘
//!                          │                  │           │
//!                          ▼                  ▼           ▼
//!                   ┌────────────┐     ┌───────────┐ ┌──────────┐
//!                   │  bits.rs   │◀────│  store/   │ │  query/  │
//!                   │ (BitVector)│     │ (pages)   │ │ (scans,  │
//!                   └────────────┘     └───────────┘ │  select) │
//!                                                    └──────────┘
//! ```
//!
//! # Files
//!
//! | File         | One entry per      | Entry width |
//! |--------------|--------------------|-------------|
//! | `name.data`  | tuple              | `tupsize`   |
//! | `name.tsig`  | tuple              | `tm` bits   |
//! | `name.psig`  | data page          | `pm` bits   |
//! | `name.bsig`  | page-signature bit | `bm` bits   |
//!
//! The bit-slice file is the transpose of the page-signature file: bit `j` of
//! slice `i` is set exactly when bit `i` of page signature `j` is set.
//!
//! # Usage
//!
//! ```no_run
//! use sigfile::{QueryPattern, RelnConfig, Relation, Strategy, Tuple};
//!
//! # fn main() -> sigfile::Result<()> {
//! let config = RelnConfig::from_false_positive_rate(3, 0.01, 256, 1024)?;
//! let mut rel = Relation::create("people", &config)?;
//! rel.insert(&Tuple::parse("ada,lovelace,1815", 3)?)?;
//!
//! let query = QueryPattern::parse("ada,?,?", 3)?;
//! let found = rel.select(&query, Strategy::BitSlices)?;
//! assert_eq!(found.tuples.len(), 1);
//! rel.close()?;
//! # Ok(())
//! # }
//! ```

pub mod bits;
pub mod config;
pub mod error;
pub mod query;
pub mod relation;
pub mod signature;
pub mod store;
pub mod tuple;

pub mod testing;

pub use bits::BitVector;
pub use config::RelnConfig;
pub use error::{Result, SigError};
pub use query::{
    scan_bit_slices, scan_page_signatures, scan_tuple_signatures, Candidates, QueryStats,
    Selection, Strategy,
};
pub use relation::{RelnParams, RelnStats, Relation};
pub use signature::{codeword, superimpose, SignatureShape};
pub use store::{BlockFile, Page, PageId, DEFAULT_PAGE_SIZE};
pub use tuple::{tuple_size, QueryPattern, Tuple, WILDCARD};
