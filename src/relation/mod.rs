// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A relation: one header plus four page files kept in lock-step.
//!
//! ```text
//! name.info   RelnParams header (rewritten on close)
//! name.data   tuples, tup_pp per page
//! name.tsig   one tuple signature per tuple, tsig_pp per page
//! name.psig   one page signature per data page, psig_pp per page
//! name.bsig   pm bit-slices of bm bits, bsig_pp per page
//! ```
//!
//! The three signature files are derived from the data file. Inserts keep
//! them consistent (see `insert`); nothing else writes to them.

mod insert;
pub mod params;

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::bits::BitVector;
use crate::config::RelnConfig;
use crate::error::{Result, SigError};
use crate::signature::SignatureShape;
use crate::store::{BlockFile, Page, PageId};
use crate::tuple::Tuple;

pub use params::RelnParams;

const INFO_SUFFIX: &str = "info";
const DATA_SUFFIX: &str = "data";
const TSIG_SUFFIX: &str = "tsig";
const PSIG_SUFFIX: &str = "psig";
const BSIG_SUFFIX: &str = "bsig";

/// `name.suffix`, keeping any dots already in `name`.
fn file_path(name: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(name.as_os_str());
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

/// An open relation.
#[derive(Debug)]
pub struct Relation {
    name: PathBuf,
    params: RelnParams,
    info: File,
    pub(crate) data: BlockFile,
    pub(crate) tsig: BlockFile,
    pub(crate) psig: BlockFile,
    pub(crate) bsig: BlockFile,
}

/// Snapshot of a relation's parameters and on-disk page counts.
#[derive(Debug, Clone, Serialize)]
pub struct RelnStats {
    pub name: String,
    #[serde(flatten)]
    pub params: RelnParams,
    /// Pages actually present in each file: data, tsig, psig, bsig.
    pub file_pages: [usize; 4],
}

impl Relation {
    /// Does a relation called `name` exist?
    pub fn exists(name: impl AsRef<Path>) -> bool {
        file_path(name.as_ref(), INFO_SUFFIX).exists()
    }

    /// Create a new relation and leave it open.
    ///
    /// Every file starts with one page. The bit-slice file is filled with `pm`
    /// zero slices, one per page-signature bit.
    pub fn create(name: impl AsRef<Path>, config: &RelnConfig) -> Result<Self> {
        let name = name.as_ref().to_path_buf();
        let info_path = file_path(&name, INFO_SUFFIX);
        if info_path.exists() {
            return Err(SigError::AlreadyExists { path: info_path });
        }
        let params = RelnParams::derive(config)?;

        let info = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&info_path)?;
        let rel = match Self::lay_out(name.clone(), params, info) {
            Ok(rel) => rel,
            Err(e) => {
                for suffix in [INFO_SUFFIX, DATA_SUFFIX, TSIG_SUFFIX, PSIG_SUFFIX, BSIG_SUFFIX] {
                    let _ = std::fs::remove_file(file_path(&name, suffix));
                }
                return Err(e);
            }
        };

        info!(
            name = %rel.name.display(),
            nattrs = rel.params.nattrs,
            tk = rel.params.tk,
            tm = rel.params.tm,
            pm = rel.params.pm,
            bm = rel.params.bm,
            bsig_pages = rel.params.bsig_npages,
            "created relation"
        );
        Ok(rel)
    }

    /// Create the four block files and write the first header. On failure the
    /// caller removes whatever was created.
    fn lay_out(name: PathBuf, mut params: RelnParams, info: File) -> Result<Self> {
        let page_size = params.page_size;
        let mut data = BlockFile::create(file_path(&name, DATA_SUFFIX), page_size)?;
        let mut tsig = BlockFile::create(file_path(&name, TSIG_SUFFIX), page_size)?;
        let mut psig = BlockFile::create(file_path(&name, PSIG_SUFFIX), page_size)?;
        let mut bsig = BlockFile::create(file_path(&name, BSIG_SUFFIX), page_size)?;

        data.allocate_page()?;
        params.npages = 1;
        tsig.allocate_page()?;
        params.tsig_npages = 1;
        psig.allocate_page()?;
        params.psig_npages = 1;
        bsig.allocate_page()?;
        params.bsig_npages = 1;

        let zero = BitVector::new(params.bm);
        let mut pid = 0;
        let mut page = Page::new(page_size);
        for _ in 0..params.pm {
            if page.item_count() == params.bsig_pp {
                bsig.write_page(pid, &page)?;
                pid = bsig.allocate_page()?;
                params.bsig_npages += 1;
                page = Page::new(page_size);
            }
            page.push_bits(&zero)?;
            params.nbsigs += 1;
        }
        bsig.write_page(pid, &page)?;

        let mut rel = Self {
            name,
            params,
            info,
            data,
            tsig,
            psig,
            bsig,
        };
        rel.write_header()?;
        Ok(rel)
    }

    /// Open an existing relation.
    pub fn open(name: impl AsRef<Path>) -> Result<Self> {
        let name = name.as_ref().to_path_buf();
        let info_path = file_path(&name, INFO_SUFFIX);
        let mut info = match OpenOptions::new().read(true).write(true).open(&info_path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SigError::NotFound { path: info_path });
            }
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::with_capacity(RelnParams::FILE_SIZE);
        info.read_to_end(&mut bytes)?;
        let params = RelnParams::from_bytes(&bytes)?;
        let page_size = params.page_size;

        let rel = Self {
            data: BlockFile::open(file_path(&name, DATA_SUFFIX), page_size)?,
            tsig: BlockFile::open(file_path(&name, TSIG_SUFFIX), page_size)?,
            psig: BlockFile::open(file_path(&name, PSIG_SUFFIX), page_size)?,
            bsig: BlockFile::open(file_path(&name, BSIG_SUFFIX), page_size)?,
            name,
            params,
            info,
        };
        rel.check_files()?;
        info!(
            name = %rel.name.display(),
            ntups = rel.params.ntups,
            npages = rel.params.npages,
            "opened relation"
        );
        Ok(rel)
    }

    /// Persist counters and release the files.
    pub fn close(mut self) -> Result<()> {
        self.write_header()?;
        for file in [&self.data, &self.tsig, &self.psig, &self.bsig] {
            file.sync()?;
        }
        info!(
            name = %self.name.display(),
            ntups = self.params.ntups,
            npages = self.params.npages,
            "closed relation"
        );
        Ok(())
    }

    /// Compare the header counters with what the files hold.
    ///
    /// A relation dropped without `close` keeps its pages but not its
    /// counters; inserting into it would put page signatures and bit-slices
    /// out of step.
    fn check_files(&self) -> Result<()> {
        let p = &self.params;
        let files = [
            ("data", &self.data, p.npages, p.tup_pp, p.ntups),
            ("tsig", &self.tsig, p.tsig_npages, p.tsig_pp, p.ntsigs),
            ("psig", &self.psig, p.psig_npages, p.psig_pp, p.npsigs),
            ("bsig", &self.bsig, p.bsig_npages, p.bsig_pp, p.nbsigs),
        ];
        for (what, file, npages, per_page, nitems) in files {
            let on_disk = file.page_count()?;
            if on_disk != npages {
                return Err(SigError::corrupt(format!(
                    "{what} file has {on_disk} pages, header records {npages}"
                )));
            }
            let last = file.read_page((npages - 1) as PageId)?;
            let stored = (npages - 1) * per_page + last.item_count();
            if stored != nitems {
                return Err(SigError::corrupt(format!(
                    "{what} file holds {stored} items, header records {nitems}"
                )));
            }
        }
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        let bytes = self.params.to_bytes();
        self.info.seek(SeekFrom::Start(0))?;
        self.info.write_all(&bytes)?;
        self.info.set_len(bytes.len() as u64)?;
        self.info.sync_all()?;
        Ok(())
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn params(&self) -> &RelnParams {
        &self.params
    }

    pub fn shape(&self) -> SignatureShape {
        self.params.shape()
    }

    /// Parameters plus the page counts the files really have.
    pub fn stats(&self) -> Result<RelnStats> {
        Ok(RelnStats {
            name: self.name.display().to_string(),
            params: self.params.clone(),
            file_pages: [
                self.data.page_count()?,
                self.tsig.page_count()?,
                self.psig.page_count()?,
                self.bsig.page_count()?,
            ],
        })
    }

    /// Load one stored page signature.
    pub fn page_signature(&self, page: usize) -> Result<BitVector> {
        if page >= self.params.npsigs {
            return Err(SigError::OutOfRange {
                index: page,
                limit: self.params.npsigs,
            });
        }
        let mut sig = BitVector::new(self.params.pm);
        let p = self.psig.read_page((page / self.params.psig_pp) as u32)?;
        p.get_bits(page % self.params.psig_pp, &mut sig)?;
        Ok(sig)
    }

    /// Load one stored bit-slice.
    pub fn bit_slice(&self, bit: usize) -> Result<BitVector> {
        if bit >= self.params.nbsigs {
            return Err(SigError::OutOfRange {
                index: bit,
                limit: self.params.nbsigs,
            });
        }
        let mut slice = BitVector::new(self.params.bm);
        let p = self.bsig.read_page((bit / self.params.bsig_pp) as u32)?;
        p.get_bits(bit % self.params.bsig_pp, &mut slice)?;
        Ok(slice)
    }

    /// Load the tuple in `slot` of data page `page`.
    pub fn tuple_at(&self, page: usize, slot: usize) -> Result<Tuple> {
        if page >= self.params.npages {
            return Err(SigError::OutOfRange {
                index: page,
                limit: self.params.npages,
            });
        }
        let p = self.data.read_page(page as u32)?;
        if slot >= p.item_count() {
            return Err(SigError::OutOfRange {
                index: slot,
                limit: p.item_count(),
            });
        }
        Ok(Tuple::from_bytes(p.slot(slot, self.params.tupsize)?.to_vec()))
    }

    /// Load one stored tuple signature.
    pub fn tuple_signature(&self, index: usize) -> Result<BitVector> {
        if index >= self.params.ntsigs {
            return Err(SigError::OutOfRange {
                index,
                limit: self.params.ntsigs,
            });
        }
        let mut sig = BitVector::new(self.params.tm);
        let p = self.tsig.read_page((index / self.params.tsig_pp) as u32)?;
        p.get_bits(index % self.params.tsig_pp, &mut sig)?;
        Ok(sig)
    }
}
