// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal display utilities for the sigfile CLI.
//!
//! OneDark colors for dark terminals, One Light for light ones. The theme comes
//! from `SIGFILE_THEME` when set, then from `COLORFGBG`, and defaults to dark.
//! Colors are dropped entirely under `NO_COLOR` or when stdout is not a TTY,
//! so piped output stays plain.

use std::sync::OnceLock;

use sigfile::{QueryStats, RelnStats, Strategy};

// Width between │ and │ (excluding border chars)
pub const BOX_WIDTH: usize = 72;

// ═══════════════════════════════════════════════════════════════════════════
// THEME DETECTION
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

static THEME: OnceLock<Theme> = OnceLock::new();

fn detect_theme() -> Theme {
    if let Ok(theme) = std::env::var("SIGFILE_THEME") {
        match theme.to_lowercase().as_str() {
            "light" | "l" => return Theme::Light,
            "dark" | "d" => return Theme::Dark,
            _ => {}
        }
    }

    // "fg;bg": backgrounds 7 and up (except 8) are light
    if let Ok(colorfgbg) = std::env::var("COLORFGBG") {
        if let Some(bg) = colorfgbg.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                if bg_num >= 7 && bg_num != 8 {
                    return Theme::Light;
                }
            }
        }
    }

    Theme::Dark
}

pub fn theme() -> Theme {
    *THEME.get_or_init(detect_theme)
}

// ═══════════════════════════════════════════════════════════════════════════
// PALETTES
// ═══════════════════════════════════════════════════════════════════════════

fn rgb(r: u8, g: u8, b: u8) -> String {
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

mod onedark {
    pub const RED: (u8, u8, u8) = (224, 108, 117); // #e06c75
    pub const GREEN: (u8, u8, u8) = (152, 195, 121); // #98c379
    pub const YELLOW: (u8, u8, u8) = (229, 192, 123); // #e5c07b
    pub const BLUE: (u8, u8, u8) = (97, 175, 239); // #61afef
    pub const MAGENTA: (u8, u8, u8) = (198, 120, 221); // #c678dd
    pub const CYAN: (u8, u8, u8) = (86, 182, 194); // #56b6c2
    pub const GRAY: (u8, u8, u8) = (92, 99, 112); // #5c6370
}

mod onelight {
    pub const RED: (u8, u8, u8) = (228, 86, 73); // #e45649
    pub const GREEN: (u8, u8, u8) = (80, 161, 79); // #50a14f
    pub const YELLOW: (u8, u8, u8) = (193, 132, 1); // #c18401
    pub const BLUE: (u8, u8, u8) = (64, 120, 242); // #4078f2
    pub const MAGENTA: (u8, u8, u8) = (166, 38, 164); // #a626a4
    pub const CYAN: (u8, u8, u8) = (1, 132, 188); // #0184bc
    pub const GRAY: (u8, u8, u8) = (160, 161, 167); // #a0a1a7
}

macro_rules! theme_color {
    ($name:ident) => {
        #[allow(non_snake_case)]
        pub fn $name() -> String {
            let (r, g, b) = match theme() {
                Theme::Dark => onedark::$name,
                Theme::Light => onelight::$name,
            };
            rgb(r, g, b)
        }
    };
}

theme_color!(RED);
theme_color!(GREEN);
theme_color!(YELLOW);
theme_color!(BLUE);
theme_color!(MAGENTA);
theme_color!(CYAN);
theme_color!(GRAY);

// ═══════════════════════════════════════════════════════════════════════════
// CORE UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Check if colors should be used (TTY detection)
pub fn use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    atty::is(atty::Stream::Stdout)
}

/// Apply theme color with optional modifiers
pub fn themed(color_fn: fn() -> String, modifiers: &[&str], text: &str) -> String {
    if use_colors() {
        format!("{}{}{}{}", modifiers.join(""), color_fn(), text, RESET)
    } else {
        text.to_string()
    }
}

/// Visible length, ignoring ANSI escapes
pub fn visible_len(s: &str) -> usize {
    let mut in_escape = false;
    let mut len = 0;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape && c == 'm' {
            in_escape = false;
        } else if !in_escape {
            len += 1;
        }
    }
    len
}

pub fn pad_right(s: &str, width: usize) -> String {
    let visible = visible_len(s);
    if visible >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visible))
    }
}

fn border(color_fn: fn() -> String) -> (String, &'static str) {
    if use_colors() {
        (color_fn(), RESET)
    } else {
        (String::new(), "")
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BOX DRAWING
// ═══════════════════════════════════════════════════════════════════════════

/// │ content          │
pub fn row(content: &str) {
    let (b, reset) = border(GRAY);
    let pad = BOX_WIDTH.saturating_sub(visible_len(content));
    println!("{b}│{reset}{}{}{b}│{reset}", content, " ".repeat(pad));
}

/// │ label        value │, label column fixed
pub fn field(label: &str, value: &str) {
    row(&format!(" {} {}", pad_right(&themed(GRAY, &[], label), 22), value));
}

/// ┌─ LABEL ──────────┐
pub fn section_top(label: &str) {
    let (b, reset) = border(GRAY);
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!("{b}┌{reset}{}{b}{}┐{reset}", label_part, "─".repeat(remaining));
}

/// ├─ LABEL ──────────┤
pub fn section_mid(label: &str) {
    let (b, reset) = border(GRAY);
    let label_part = format!("─ {} ", themed(CYAN, &[BOLD], label));
    let remaining = BOX_WIDTH.saturating_sub(visible_len(&label_part));
    println!("{b}├{reset}{}{b}{}┤{reset}", label_part, "─".repeat(remaining));
}

/// └──────────────────┘
pub fn section_bot() {
    let (b, reset) = border(GRAY);
    println!("{b}└{}┘{reset}", "─".repeat(BOX_WIDTH));
}

// ═══════════════════════════════════════════════════════════════════════════
// SEMANTIC FORMATTERS
// ═══════════════════════════════════════════════════════════════════════════

/// Color-coded strategy badge: [t], [p], [b]
pub fn strategy_badge(strategy: Strategy) -> String {
    let tag = format!("[{}]", strategy.code());
    let color: fn() -> String = match strategy {
        Strategy::TupleSignatures => MAGENTA,
        Strategy::PageSignatures => BLUE,
        Strategy::BitSlices => GREEN,
    };
    format!("{} {}", themed(color, &[BOLD], &tag), strategy)
}

/// `part / whole` with a percentage, green when small, red when large.
pub fn fraction(part: usize, whole: usize) -> String {
    if whole == 0 {
        return format!("{} / 0", part);
    }
    let pct = part as f64 / whole as f64 * 100.0;
    let color: fn() -> String = if pct <= 10.0 {
        GREEN
    } else if pct <= 50.0 {
        YELLOW
    } else {
        RED
    };
    format!("{} / {} {}", part, whole, themed(color, &[], &format!("({:.1}%)", pct)))
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub fn print_stats(stats: &RelnStats) {
    let p = &stats.params;
    let page = p.page_size;

    section_top(&stats.name);
    field("attributes", &p.nattrs.to_string());
    field("false-positive target", &format!("{}", p.pf));
    field("page size", &format_size(page));
    field("tuples", &format!("{} ({} per page)", p.ntups, p.tup_pp));
    field("data pages", &fraction(p.npages, p.bm));

    section_mid("SIGNATURES");
    field("codeword weight (tk)", &p.tk.to_string());
    field(
        "tuple (tm)",
        &format!("{} bits, {} per page, {} stored", p.tm, p.tsig_pp, p.ntsigs),
    );
    field(
        "page (pm)",
        &format!("{} bits, {} per page, {} stored", p.pm, p.psig_pp, p.npsigs),
    );
    field(
        "bit-slice (bm)",
        &format!("{} bits, {} per page, {} stored", p.bm, p.bsig_pp, p.nbsigs),
    );

    section_mid("FILES");
    for (suffix, pages) in ["data", "tsig", "psig", "bsig"].iter().zip(stats.file_pages) {
        field(
            &format!(".{}", suffix),
            &format!("{} pages, {}", pages, format_size(pages * page)),
        );
    }
    section_bot();
}

pub fn print_query_stats(query: &str, stats: &QueryStats, total_pages: usize) {
    section_top("QUERY");
    field("pattern", query);
    field("strategy", &strategy_badge(stats.strategy));
    section_mid("COST");
    field("signatures examined", &stats.nsigs.to_string());
    field("signature pages read", &stats.nsigpages.to_string());
    field("candidate pages", &fraction(stats.candidate_pages, total_pages));
    field("data pages read", &stats.data_pages_read.to_string());
    field("tuples examined", &stats.tuples_examined.to_string());
    section_mid("RESULT");
    field("matches", &themed(GREEN, &[BOLD], &stats.matches.to_string()));
    field(
        "false-positive pages",
        &fraction(stats.false_positive_pages, stats.candidate_pages),
    );
    section_bot();
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
