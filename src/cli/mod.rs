// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the sigfile command-line interface.
//!
//! Five subcommands: `create` makes a relation, `insert` loads tuples from a
//! file or stdin, `select` runs a pattern query with a chosen strategy,
//! `stats` prints the stored parameters, and `gen` emits random tuples to
//! feed into `insert`.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sigfile::{Strategy, DEFAULT_PAGE_SIZE};

#[derive(Parser)]
#[command(
    name = "sigfile",
    about = "Signature-file index with superimposed coding and bit-slices",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new relation
    ///
    /// Signature sizes are derived from --pf unless given explicitly.
    /// A --config JSON file replaces all derived values.
    Create {
        /// Relation name (files are written as NAME.info, NAME.data, ...)
        name: PathBuf,

        /// Attributes per tuple
        #[arg(short, long, default_value = "3")]
        attrs: usize,

        /// Target false-positive probability
        #[arg(long, default_value = "0.001")]
        pf: f64,

        /// Maximum number of data pages (bit-slice width)
        #[arg(long, default_value = "1024")]
        max_pages: usize,

        /// Bytes per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Override codeword weight
        #[arg(long)]
        tk: Option<usize>,

        /// Override tuple signature width in bits
        #[arg(long)]
        tm: Option<usize>,

        /// Override page signature width in bits
        #[arg(long)]
        pm: Option<usize>,

        /// Override bit-slice width in bits
        #[arg(long)]
        bm: Option<usize>,

        /// Read the full configuration from a JSON file
        #[arg(long, conflicts_with_all = ["tk", "tm", "pm", "bm"])]
        config: Option<PathBuf>,
    },

    /// Insert comma-separated tuples, one per line
    Insert {
        /// Relation name
        name: PathBuf,

        /// Input file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Find tuples matching a pattern such as "a,?,c"
    Select {
        /// Relation name
        name: PathBuf,

        /// Query pattern; "?" matches any value
        query: String,

        /// Candidate strategy: t (tuple sigs), p (page sigs), b (bit-slices)
        #[arg(short, long, default_value = "b")]
        strategy: Strategy,

        /// Emit matches and statistics as JSON
        #[arg(long)]
        json: bool,

        /// Print statistics only
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show relation parameters and counters
    Stats {
        /// Relation name
        name: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate random tuples on stdout
    Gen {
        /// Number of tuples
        count: usize,

        /// Attributes per tuple
        #[arg(short, long, default_value = "3")]
        attrs: usize,

        /// Distinct values per non-key attribute
        #[arg(long, default_value = "1000")]
        distinct: u32,

        /// PRNG seed for reproducible output
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}
