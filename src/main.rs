// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use sigfile::{QueryPattern, RelnConfig, Relation, Strategy, Tuple};

mod cli;
use cli::display;
use cli::{Cli, Commands};

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create {
            name,
            attrs,
            pf,
            max_pages,
            page_size,
            tk,
            tm,
            pm,
            bm,
            config,
        } => build_config(attrs, pf, max_pages, page_size, [tk, tm, pm, bm], config)
            .and_then(|config| run_create(&name, &config)),
        Commands::Insert { name, input } => run_insert(&name, input.as_deref()),
        Commands::Select {
            name,
            query,
            strategy,
            json,
            quiet,
        } => run_select(&name, &query, strategy, json, quiet),
        Commands::Stats { name, json } => run_stats(&name, json),
        Commands::Gen {
            count,
            attrs,
            distinct,
            seed,
        } => run_gen(count, attrs, distinct, seed),
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `SIGFILE_LOG` (default: warnings only).
fn init_logging() {
    let filter = EnvFilter::try_from_env("SIGFILE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn build_config(
    attrs: usize,
    pf: f64,
    max_pages: usize,
    page_size: usize,
    overrides: [Option<usize>; 4],
    config_file: Option<PathBuf>,
) -> Result<RelnConfig> {
    if let Some(path) = config_file {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        return Ok(RelnConfig::from_json(&text)?);
    }
    let mut config = RelnConfig::from_false_positive_rate(attrs, pf, max_pages, page_size)?;
    let [tk, tm, pm, bm] = overrides;
    config.tk = tk.unwrap_or(config.tk);
    config.tm = tm.unwrap_or(config.tm);
    config.pm = pm.unwrap_or(config.pm);
    config.bm = bm.unwrap_or(config.bm);
    Ok(config)
}

fn run_create(name: &Path, config: &RelnConfig) -> Result<()> {
    let rel = Relation::create(name, config)
        .with_context(|| format!("creating relation {}", name.display()))?;
    let stats = rel.stats()?;
    rel.close()?;
    display::print_stats(&stats);
    Ok(())
}

fn run_insert(name: &Path, input: Option<&Path>) -> Result<()> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            fs::File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut rel = Relation::open(name)?;
    let pages_before = rel.params().npages;
    let loaded = insert_lines(&mut rel, reader);
    let pages_added = rel.params().npages - pages_before;
    // Save counters for the lines that made it in.
    rel.close()?;
    let inserted = loaded?;

    println!(
        "✓ inserted {} tuples into {} ({} new data pages)",
        inserted,
        name.display(),
        pages_added
    );
    Ok(())
}

/// Insert one tuple per non-blank line, stopping at the first failure.
fn insert_lines(rel: &mut Relation, reader: impl BufRead) -> Result<usize> {
    let nattrs = rel.params().nattrs;
    let mut inserted = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let tuple =
            Tuple::parse(&line, nattrs).with_context(|| format!("line {}", lineno + 1))?;
        rel.insert(&tuple)
            .with_context(|| format!("inserting line {}", lineno + 1))?;
        inserted += 1;
    }
    Ok(inserted)
}

fn run_select(name: &Path, query: &str, strategy: Strategy, json: bool, quiet: bool) -> Result<()> {
    let rel = Relation::open(name)?;
    let pattern = QueryPattern::parse(query, rel.params().nattrs)?;
    let selection = rel.select(&pattern, strategy)?;

    if json {
        let matches: Vec<String> = selection.tuples.iter().map(ToString::to_string).collect();
        let out = json!({
            "query": pattern.to_string(),
            "matches": matches,
            "candidate_pages": selection.candidates.page_ids(),
            "stats": selection.stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if !quiet {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for tuple in &selection.tuples {
            writeln!(out, "{}", tuple)?;
        }
        out.flush()?;
    }
    display::print_query_stats(&pattern.to_string(), &selection.stats, rel.params().npages);
    Ok(())
}

fn run_stats(name: &Path, json: bool) -> Result<()> {
    let rel = Relation::open(name)?;
    let stats = rel.stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        display::print_stats(&stats);
    }
    Ok(())
}

/// Random tuples: a unique key followed by `attrs - 1` values drawn from
/// `distinct` choices each, so equality queries have something to find.
fn run_gen(count: usize, attrs: usize, distinct: u32, seed: u64) -> Result<()> {
    anyhow::ensure!(attrs >= 2, "at least 2 attributes required");
    anyhow::ensure!(distinct > 0, "--distinct must be positive");

    let mut rng = StdRng::seed_from_u64(seed);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for i in 0..count {
        let mut line = format!("{:07}", i);
        for a in 1..attrs {
            let prefix = char::from(b'a' + ((a - 1) % 26) as u8);
            line.push(',');
            line.push(prefix);
            line.push_str(&rng.gen_range(0..distinct).to_string());
        }
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}
