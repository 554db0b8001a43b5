// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Relation header: structural parameters plus running counters.
//!
//! The header is the whole of the `.info` file. It is read once on open and
//! rewritten wholesale on close, so counters changed by inserts are only
//! durable after a clean close.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ magic "SIGF" [4] │ version u8 │ reserved [3] │
//! │ pf: f64                                      │
//! │ 14 × u32 static: nattrs page_size tupsize    │
//! │   tup_pp tk tm tsig_size tsig_pp pm          │
//! │   psig_size psig_pp bm bsig_size bsig_pp     │
//! │ 8 × u32 dynamic: npages ntups tsig_npages    │
//! │   ntsigs psig_npages npsigs bsig_npages      │
//! │   nbsigs                                     │
//! ├──────────────────────────────────────────────┤
//! │ crc32 of everything above: u32               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! All integers little-endian.

use crc32fast::Hasher as Crc32Hasher;
use serde::Serialize;

use crate::config::RelnConfig;
use crate::error::{Result, SigError};
use crate::signature::SignatureShape;
use crate::store::{Page, PAGE_HEADER_SIZE};
use crate::tuple::tuple_size;

/// Magic bytes: "SIGF"
pub const MAGIC: [u8; 4] = [0x53, 0x49, 0x47, 0x46];

/// Current header version
pub const VERSION: u8 = 1;

const STATIC_FIELDS: usize = 14;
const DYNAMIC_FIELDS: usize = 8;

/// Round `bits` up to a whole number of bytes.
#[inline]
pub fn round_to_byte(bits: usize) -> usize {
    bits.div_ceil(8) * 8
}

/// Persisted relation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelnParams {
    // Static, fixed at creation
    pub nattrs: usize,
    pub pf: f64,
    pub page_size: usize,
    pub tupsize: usize,
    pub tup_pp: usize,
    pub tk: usize,
    pub tm: usize,
    pub tsig_size: usize,
    pub tsig_pp: usize,
    pub pm: usize,
    pub psig_size: usize,
    pub psig_pp: usize,
    pub bm: usize,
    pub bsig_size: usize,
    pub bsig_pp: usize,

    // Dynamic, updated in memory and persisted on close
    pub npages: usize,
    pub ntups: usize,
    pub tsig_npages: usize,
    pub ntsigs: usize,
    pub psig_npages: usize,
    pub npsigs: usize,
    pub bsig_npages: usize,
    pub nbsigs: usize,
}

impl RelnParams {
    // 4 (magic) + 1 (version) + 3 (reserved) + 8 (pf) + 22*4 (u32s) = 104
    pub const SIZE: usize = 16 + 4 * (STATIC_FIELDS + DYNAMIC_FIELDS);

    /// Header plus trailing checksum.
    pub const FILE_SIZE: usize = Self::SIZE + 4;

    /// Validate `config` and compute every derived size.
    ///
    /// Counters start at zero; the caller fills them in while laying out the
    /// initial files.
    pub fn derive(config: &RelnConfig) -> Result<Self> {
        if config.nattrs < 2 {
            return Err(SigError::invalid("nattrs", "at least 2 attributes required"));
        }
        if config.page_size <= PAGE_HEADER_SIZE || config.page_size > u32::MAX as usize {
            return Err(SigError::invalid(
                "page_size",
                format!("{} bytes cannot hold a page header", config.page_size),
            ));
        }
        if !(config.pf > 0.0 && config.pf <= 1.0) {
            return Err(SigError::invalid("pf", format!("{} is not in (0, 1]", config.pf)));
        }
        for (name, bits) in [("tm", config.tm), ("pm", config.pm), ("bm", config.bm)] {
            if bits == 0 {
                return Err(SigError::invalid(name, "width must be positive"));
            }
        }

        let tm = round_to_byte(config.tm);
        let pm = round_to_byte(config.pm);
        let bm = round_to_byte(config.bm);
        if config.tk == 0 || config.tk > tm || config.tk > pm {
            return Err(SigError::invalid(
                "tk",
                format!("codeword weight {} must be in 1..={}", config.tk, tm.min(pm)),
            ));
        }

        let page_size = config.page_size;
        let tupsize = tuple_size(config.nattrs);
        let tup_pp = Page::capacity(page_size, tupsize);
        if tup_pp < 1 {
            return Err(SigError::capacity(format!(
                "a {}-byte tuple does not fit in a {}-byte page",
                tupsize, page_size
            )));
        }

        let tsig_size = tm / 8;
        let tsig_pp = Page::capacity(page_size, tsig_size);
        if tsig_pp < 1 {
            return Err(SigError::capacity(format!(
                "a {}-bit tuple signature does not fit in a {}-byte page",
                tm, page_size
            )));
        }

        let psig_size = pm / 8;
        let psig_pp = Page::capacity(page_size, psig_size);
        if psig_pp < 2 {
            return Err(SigError::capacity(format!(
                "{}-bit page signatures leave {} slot(s) per page, need at least 2",
                pm, psig_pp
            )));
        }

        let bsig_size = bm / 8;
        let bsig_pp = Page::capacity(page_size, bsig_size);
        if bsig_pp < 2 {
            return Err(SigError::capacity(format!(
                "{}-bit bit-slices leave {} slot(s) per page, need at least 2",
                bm, bsig_pp
            )));
        }

        Ok(Self {
            nattrs: config.nattrs,
            pf: config.pf,
            page_size,
            tupsize,
            tup_pp,
            tk: config.tk,
            tm,
            tsig_size,
            tsig_pp,
            pm,
            psig_size,
            psig_pp,
            bm,
            bsig_size,
            bsig_pp,
            npages: 0,
            ntups: 0,
            tsig_npages: 0,
            ntsigs: 0,
            psig_npages: 0,
            npsigs: 0,
            bsig_npages: 0,
            nbsigs: 0,
        })
    }

    /// Codeword weight and signature widths.
    pub fn shape(&self) -> SignatureShape {
        SignatureShape {
            tk: self.tk,
            tm: self.tm,
            pm: self.pm,
        }
    }

    fn static_fields(&self) -> [usize; STATIC_FIELDS] {
        [
            self.nattrs,
            self.page_size,
            self.tupsize,
            self.tup_pp,
            self.tk,
            self.tm,
            self.tsig_size,
            self.tsig_pp,
            self.pm,
            self.psig_size,
            self.psig_pp,
            self.bm,
            self.bsig_size,
            self.bsig_pp,
        ]
    }

    fn dynamic_fields(&self) -> [usize; DYNAMIC_FIELDS] {
        [
            self.npages,
            self.ntups,
            self.tsig_npages,
            self.ntsigs,
            self.psig_npages,
            self.npsigs,
            self.bsig_npages,
            self.nbsigs,
        ]
    }

    /// Encode header and checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::FILE_SIZE);
        buf.extend_from_slice(&MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&[0u8; 3]); // reserved
        buf.extend_from_slice(&self.pf.to_le_bytes());
        for v in self.static_fields().into_iter().chain(self.dynamic_fields()) {
            buf.extend_from_slice(&(v as u32).to_le_bytes());
        }
        let crc = compute_crc32(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Decode and validate a header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::FILE_SIZE {
            return Err(SigError::corrupt(format!(
                "header is {} bytes, expected {}",
                bytes.len(),
                Self::FILE_SIZE
            )));
        }
        if bytes[..4] != MAGIC {
            return Err(SigError::corrupt(format!(
                "invalid magic: expected SIGF, got {:?}",
                &bytes[..4]
            )));
        }
        if bytes[4] != VERSION {
            return Err(SigError::corrupt(format!("unsupported version {}", bytes[4])));
        }

        let stored = read_u32(bytes, Self::SIZE) as u32;
        let actual = compute_crc32(&bytes[..Self::SIZE]);
        if stored != actual {
            return Err(SigError::corrupt(format!(
                "checksum mismatch: stored {:08x}, computed {:08x}",
                stored, actual
            )));
        }

        let mut pf = [0u8; 8];
        pf.copy_from_slice(&bytes[8..16]);
        let field = |i: usize| read_u32(bytes, 16 + 4 * i);

        let params = Self {
            pf: f64::from_le_bytes(pf),
            nattrs: field(0),
            page_size: field(1),
            tupsize: field(2),
            tup_pp: field(3),
            tk: field(4),
            tm: field(5),
            tsig_size: field(6),
            tsig_pp: field(7),
            pm: field(8),
            psig_size: field(9),
            psig_pp: field(10),
            bm: field(11),
            bsig_size: field(12),
            bsig_pp: field(13),
            npages: field(14),
            ntups: field(15),
            tsig_npages: field(16),
            ntsigs: field(17),
            psig_npages: field(18),
            npsigs: field(19),
            bsig_npages: field(20),
            nbsigs: field(21),
        };
        params.check_layout()?;
        Ok(params)
    }

    /// The decoded sizes must be the ones `derive` would compute from the
    /// decoded configuration, and every file must own at least one page.
    fn check_layout(&self) -> Result<()> {
        let config = RelnConfig {
            nattrs: self.nattrs,
            pf: self.pf,
            page_size: self.page_size,
            tk: self.tk,
            tm: self.tm,
            pm: self.pm,
            bm: self.bm,
        };
        let expected = Self::derive(&config)
            .map_err(|e| SigError::corrupt(format!("inconsistent layout: {e}")))?;
        if expected.static_fields() != self.static_fields() {
            return Err(SigError::corrupt(format!(
                "inconsistent layout: sizes {:?}, expected {:?}",
                self.static_fields(),
                expected.static_fields()
            )));
        }
        let counts = [
            self.npages,
            self.tsig_npages,
            self.psig_npages,
            self.bsig_npages,
        ];
        if counts.contains(&0) {
            return Err(SigError::corrupt(format!("empty file in page counts {counts:?}")));
        }
        if self.npages > self.bm {
            return Err(SigError::corrupt(format!(
                "{} data pages exceed {}-bit slices",
                self.npages, self.bm
            )));
        }
        Ok(())
    }
}

fn read_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

fn compute_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
