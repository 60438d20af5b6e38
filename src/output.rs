//! CLI output formatting for `build` and `check`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Authors lead with
//! their positional index and name; file paths only appear as secondary
//! context, for records that were skipped. Record text is stored escaped for
//! HTML, so names are unescaped before they reach the terminal.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Authors
//! 001 Ann Example (12 posts, 12 verified, rating 5.77)
//!     Economist
//! 002 Bob & Partners (4 posts, 2 verified, rating 5.45)
//!
//! Totals
//!     Authors: 2
//!     Posts: 16
//!     Verified: 14
//!     Success: 50%
//!     Complex: 44%
//!     Confident: 44%
//!
//! Skipped
//!     data/posts/1000/16.md: post 16: invalid status value 'maybe'
//! ```
//!
//! ## Build
//!
//! ```text
//! Ranking
//! 001 Ann Example → 5.77 (12 verified)
//!
//! Pages
//!     en: 28
//!     ru: 28
//!     Feed fragments: 0
//!     Static files: 4
//!
//! Generated 2 authors, 16 posts → public
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::{BuildReport, Corpus};
use crate::record::SkippedRecord;
use crate::stats::StatField;
use std::path::Path;

/// Description preview length in `check` output.
const DESCRIPTION_PREVIEW: usize = 60;

const TOTAL_FIELDS: [StatField; 6] = [
    StatField::TotalAuthors,
    StatField::TotalPosts,
    StatField::TotalVerified,
    StatField::SuccessPct,
    StatField::ComplexPct,
    StatField::ConfidentPct,
];

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Undo record-time HTML escaping for terminal display.
fn plain_text(escaped: &str) -> String {
    escaped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn stat_label(field: StatField) -> &'static str {
    match field {
        StatField::TotalAuthors => "Authors",
        StatField::TotalPosts => "Posts",
        StatField::TotalVerified => "Verified",
        StatField::SuccessPct => "Success",
        StatField::ComplexPct => "Complex",
        StatField::ConfidentPct => "Confident",
        StatField::Rating => "Rating",
    }
}

/// Path relative to the project root when possible.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

fn skipped_section(skipped: &[SkippedRecord], root: &Path) -> Vec<String> {
    if skipped.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Skipped".to_string()];
    for record in skipped {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            display_path(&record.path, root),
            record.reason
        ));
    }
    lines
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the corpus inventory: every author with counts, then site totals.
///
/// Names and descriptions are shown in `locale`.
pub fn format_check_output(corpus: &Corpus, locale: &str, root: &Path) -> Vec<String> {
    let mut lines = vec!["Authors".to_string()];

    for (i, author) in corpus.authors.values().enumerate() {
        lines.push(format!(
            "{} {} ({}, {} verified, rating {})",
            format_index(i + 1),
            plain_text(author.name.get(locale)),
            plural(author.stat.total_posts, "post"),
            author.stat.total_verified,
            author.stat.rating_label()
        ));
        let description = plain_text(author.description.get(locale));
        if !description.is_empty() {
            lines.push(format!(
                "{}{}",
                indent(1),
                truncate_desc(&description, DESCRIPTION_PREVIEW)
            ));
        }
    }

    lines.push(String::new());
    lines.push("Totals".to_string());
    for field in TOTAL_FIELDS {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            stat_label(field),
            corpus.stat.field(field)
        ));
    }

    lines.extend(skipped_section(&corpus.skipped, root));
    lines
}

pub fn print_check_output(corpus: &Corpus, locale: &str, root: &Path) {
    for line in format_check_output(corpus, locale, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the build summary: rating table, pages per locale, skipped records.
pub fn format_build_output(report: &BuildReport, root: &Path) -> Vec<String> {
    let mut lines = vec!["Ranking".to_string()];
    if report.ranking.is_empty() {
        lines.push(format!("{}(no author has enough verified posts)", indent(1)));
    }
    for (i, entry) in report.ranking.iter().enumerate() {
        lines.push(format!(
            "{} {} → {} ({} verified)",
            format_index(i + 1),
            plain_text(&entry.name),
            entry.rating,
            entry.verified
        ));
    }

    lines.push(String::new());
    lines.push("Pages".to_string());
    for (locale, count) in &report.pages {
        lines.push(format!("{}{}: {}", indent(1), locale, count));
    }
    lines.push(format!("{}Feed fragments: {}", indent(1), report.fragments));
    lines.push(format!("{}Static files: {}", indent(1), report.static_files));

    lines.extend(skipped_section(&report.skipped, root));

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {} → {}",
        plural(report.authors, "author"),
        plural(report.posts, "post"),
        display_path(&report.output, root)
    ));
    lines
}

pub fn print_build_output(report: &BuildReport, root: &Path) {
    for line in format_build_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
