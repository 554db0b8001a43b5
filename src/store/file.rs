// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Files made of fixed-size pages.
//!
//! Page `n` lives at byte offset `n * page_size`. Growing a file appends one
//! zeroed page. Nothing is cached: every read goes to the file and every
//! write is explicit.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::page::{Page, PageId};
use crate::error::{Result, SigError};

/// A block-structured file with a fixed page size.
#[derive(Debug)]
pub struct BlockFile {
    file: File,
    path: PathBuf,
    page_size: usize,
}

impl BlockFile {
    /// Create (or truncate) an empty file.
    pub fn create(path: impl AsRef<Path>, page_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self {
            file,
            path,
            page_size,
        })
    }

    /// Open an existing file.
    pub fn open(path: impl AsRef<Path>, page_size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SigError::NotFound { path: path.clone() },
                _ => SigError::Io(e),
            })?;
        Ok(Self {
            file,
            path,
            page_size,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Pages currently in the file, derived from its length.
    pub fn page_count(&self) -> Result<usize> {
        let len = self.file.metadata()?.len() as usize;
        Ok(len / self.page_size)
    }

    fn offset(&self, pid: PageId) -> u64 {
        u64::from(pid) * self.page_size as u64
    }

    /// Append a zeroed page and return its id.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let alloc_err = |source| SigError::Allocation {
            path: self.path.clone(),
            source,
        };
        let pid = self.page_count()? as PageId;
        let zeros = vec![0u8; self.page_size];
        let mut file = &self.file;
        file.seek(SeekFrom::Start(self.offset(pid)))
            .map_err(alloc_err)?;
        file.write_all(&zeros).map_err(alloc_err)?;
        Ok(pid)
    }

    /// Read page `pid` into a fresh buffer.
    pub fn read_page(&self, pid: PageId) -> Result<Page> {
        let mut data = vec![0u8; self.page_size];
        let mut file = &self.file;
        file.seek(SeekFrom::Start(self.offset(pid)))?;
        file.read_exact(&mut data)?;
        Ok(Page::from_bytes(data))
    }

    /// Write `page` back at `pid`.
    pub fn write_page(&mut self, pid: PageId, page: &Page) -> Result<()> {
        if page.size() != self.page_size {
            return Err(SigError::SizeMismatch {
                expected: self.page_size,
                actual: page.size(),
            });
        }
        let mut file = &self.file;
        file.seek(SeekFrom::Start(self.offset(pid)))?;
        file.write_all(page.as_bytes())?;
        Ok(())
    }

    /// Flush file contents to disk.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
