//! Record parsing.
//!
//! Authors and posts are stored as small text files made of field blocks:
//!
//! ```text
//! <!-- editor notes are stripped before parsing -->
//! ### id
//! 42
//! ### author-id
//! 7
//! ### statement.en
//! Prices will double by 2030.
//! ```
//!
//! A block starts at the `###` marker; the rest of that line is the field name
//! and everything up to the next `\n###` (or end of file) is the value.
//! Values are trimmed and HTML-escaped, so the renderer can insert them as-is.
//!
//! [`parse_dir`] walks a directory tree and registers every record by its
//! `id` field. Files that cannot be read are logged and skipped; records
//! without an `id` are dropped silently. Nothing here aborts the walk.

use crate::types::{Author, InvalidValue, Localized, Post};
use chrono::NaiveDate;
use log::{debug, warn};
use maud::Escaper;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

/// Marker that opens a field block.
pub const FIELD_MARKER: &str = "###";

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
    #[error("invalid date '{value}' in field '{field}'")]
    InvalidDate { field: &'static str, value: String },
}

/// Escape `&`, `<`, `>` and `"` for inclusion in HTML text or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = Escaper::new(&mut out).write_str(text);
    out
}

/// Remove `<!-- ... -->` ranges. Matching is non-greedy, so text between two
/// comments survives, and dashes inside a comment do not end it early.
pub fn strip_comments(text: &str) -> String {
    COMMENT_RE.replace_all(text, "").into_owned()
}

/// A parsed record: field name → escaped, trimmed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Parse record text. Later duplicates of a field win.
    pub fn parse(text: &str) -> Record {
        let text = strip_comments(text);
        let mut fields = BTreeMap::new();

        let Some(start) = text.find(FIELD_MARKER) else {
            return Record { fields };
        };
        let separator = format!("\n{FIELD_MARKER}");

        for block in text[start + FIELD_MARKER.len()..].split(separator.as_str()) {
            // A header needs a name and a line break after it.
            let Some((name, value)) = block.trim_start().split_once('\n') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            fields.insert(name.to_string(), escape_html(value.trim()));
        }

        Record { fields }
    }

    pub fn from_file(path: &Path) -> Result<Record, RecordError> {
        let content = fs::read_to_string(path)?;
        Ok(Record::parse(&content))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Field value, or empty when absent.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Collect `<name>.<locale>` for every locale.
    pub fn localized(&self, name: &str, locales: &[String]) -> Localized {
        locales
            .iter()
            .map(|locale| {
                let value = self.text(&format!("{name}.{locale}")).to_string();
                (locale.clone(), value)
            })
            .collect()
    }

    fn required(&self, name: &'static str) -> Result<&str, RecordError> {
        self.get(name).ok_or(RecordError::MissingField(name))
    }

    fn date(&self, name: &'static str) -> Result<Option<NaiveDate>, RecordError> {
        let value = self.text(name);
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| RecordError::InvalidDate {
                field: name,
                value: value.to_string(),
            })
    }

    pub fn to_author(&self, locales: &[String]) -> Result<Author, RecordError> {
        Ok(Author {
            id: self.required("id")?.to_string(),
            name: self.localized("name", locales),
            description: self.localized("description", locales),
            posts: Vec::new(),
            stat: Default::default(),
        })
    }

    pub fn to_post(&self, locales: &[String]) -> Result<Post, RecordError> {
        Ok(Post {
            id: self.required("id")?.to_string(),
            author_id: self.required("author-id")?.to_string(),
            title: self.localized("title", locales),
            statement: self.localized("statement", locales),
            context: self.localized("context", locales),
            notes: self.localized("notes", locales),
            status: self.required("status")?.parse()?,
            complexity: self.required("complexity")?.parse()?,
            confidence: self.required("confidence")?.parse()?,
            original_language: self.text("original-language").to_string(),
            time_statement: self.date("time-statement")?,
            time_awaiting: self.date("time-awaiting")?,
            time_verified: self.date("time-verified")?,
        })
    }
}

/// A record file that was not registered.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}

/// Records found under one directory tree, keyed by id.
#[derive(Debug, Default)]
pub struct RecordSet {
    pub records: BTreeMap<String, Record>,
    /// Records keyed by id keep the file they came from, for diagnostics.
    pub sources: BTreeMap<String, PathBuf>,
    pub skipped: Vec<SkippedRecord>,
}

impl RecordSet {
    pub fn skip(&mut self, path: PathBuf, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Skipping record {}: {}", path.display(), reason);
        self.skipped.push(SkippedRecord { path, reason });
    }
}

/// Walk `root` recursively and parse every `*.<extension>` file.
///
/// A missing root yields an empty set. Entries are visited in file-name
/// order so duplicate-id resolution is stable between runs.
pub fn parse_dir(root: &Path, extension: &str) -> RecordSet {
    let mut set = RecordSet::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read {}: {}", root.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != extension) {
            continue;
        }

        let record = match Record::from_file(path) {
            Ok(record) => record,
            Err(e) => {
                set.skip(path.to_path_buf(), e.to_string());
                continue;
            }
        };

        if record.is_empty() {
            debug!("No fields in {}, ignoring", path.display());
            continue;
        }
        debug!("Parsed {} fields from {}", record.len(), path.display());

        let Some(id) = record.id().map(str::to_string) else {
            debug!("No id in {}, ignoring", path.display());
            continue;
        };
        if let Some(previous) = set.sources.get(&id) {
            warn!(
                "Duplicate id {} in {} (replaces {})",
                id,
                path.display(),
                previous.display()
            );
        }
        set.sources.insert(id.clone(), path.to_path_buf());
        set.records.insert(id, record);
    }

    set
}
