// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Block storage: page buffers and page-structured files.

mod file;
mod page;

pub use file::BlockFile;
pub use page::{Page, PageId, PAGE_HEADER_SIZE};

/// Page size used when a relation does not choose one.
pub const DEFAULT_PAGE_SIZE: usize = 1024;
