//! UI strings and per-locale date formatting.
//!
//! ## Locale strings
//!
//! A single JSON document maps UI string keys to per-locale text. Objects
//! nest freely; a string value's key is the locale tag and the path above it
//! is the string key:
//!
//! ```json
//! { "stat": { "total_posts": { "en": "Predictions", "ru": "Прогнозы" } },
//!   "awaiting": { "en": "Awaiting", "ru": "Ожидает" } }
//! ```
//!
//! flattens to `stat.total_posts` and `awaiting`. Strings are trusted site
//! copy and may contain markup; the renderer inserts them unescaped.
//!
//! ## Dates
//!
//! Dates are shown in a locale-specific long form. Each locale registers a
//! [`DateFormat`] (month names + field order) in [`DATE_FORMATS`]; adding a
//! locale means adding a row there.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocaleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Locale strings: expected text or an object at '{0}'")]
    Malformed(String),
    #[error("Locale strings: missing '{key}' for locale '{locale}'")]
    MissingString { key: String, locale: String },
}

/// Every key the renderer looks up.
pub const REQUIRED_KEYS: &[&str] = &[
    "ppm",
    "rating",
    "predictions",
    "authors",
    "notes_refs",
    "params",
    "post_total",
    "awaiting",
    "completely",
    "almost",
    "didnot",
    "unverifiable",
    "regular",
    "complex",
    "confident",
    "careful",
    "sf.new",
    "sf.awaiting",
    "sf.verified",
    "stat.total_authors",
    "stat.total_posts",
    "stat.total_verified",
    "stat.success_pct",
    "stat.rating",
    "titles.prpr",
    "titles.new",
    "titles.awaiting",
    "titles.verified",
    "titles.ranking",
    "titles.authors",
    "titles.about",
    "about_notes.rtg_note",
    "about_notes.how_rating",
];

/// Flattened UI strings: key → locale → text.
#[derive(Debug, Clone, Default)]
pub struct LocaleStrings {
    strings: BTreeMap<String, BTreeMap<String, String>>,
}

impl LocaleStrings {
    pub fn load(path: &Path) -> Result<Self, LocaleError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, LocaleError> {
        let value: Value = serde_json::from_str(json)?;
        let mut strings = LocaleStrings::default();
        strings.flatten("", &value)?;
        Ok(strings)
    }

    fn flatten(&mut self, path: &str, value: &Value) -> Result<(), LocaleError> {
        let Value::Object(map) = value else {
            return Err(LocaleError::Malformed(path.to_string()));
        };
        for (key, child) in map {
            match child {
                Value::String(text) if !path.is_empty() => self.insert(path, key, text),
                Value::Object(_) => {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    self.flatten(&child_path, child)?;
                }
                _ => {
                    let at = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    return Err(LocaleError::Malformed(at));
                }
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, key: &str, locale: &str, text: &str) {
        self.strings
            .entry(key.to_string())
            .or_default()
            .insert(locale.to_string(), text.to_string());
    }

    /// Look up a string. A miss returns the key itself so a page still
    /// renders; [`validate`](Self::validate) rules misses out up front.
    pub fn get<'a>(&'a self, key: &'a str, locale: &str) -> &'a str {
        self.strings
            .get(key)
            .and_then(|by_locale| by_locale.get(locale))
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn contains(&self, key: &str, locale: &str) -> bool {
        self.strings
            .get(key)
            .is_some_and(|by_locale| by_locale.contains_key(locale))
    }

    /// Check that every renderer key exists for every locale.
    pub fn validate(&self, locales: &[String]) -> Result<(), LocaleError> {
        for key in REQUIRED_KEYS {
            for locale in locales {
                if !self.contains(key, locale) {
                    return Err(LocaleError::MissingString {
                        key: key.to_string(),
                        locale: locale.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Order of the parts in a long date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `March 1, 2024`
    MonthDayYear,
    /// `1 марта 2024`
    DayMonthYear,
}

/// Long-form date style of one locale.
#[derive(Debug)]
pub struct DateFormat {
    pub locale: &'static str,
    pub months: [&'static str; 12],
    pub order: DateOrder,
}

impl DateFormat {
    pub fn format(&self, date: NaiveDate) -> String {
        let month = self.months[date.month0() as usize];
        match self.order {
            DateOrder::MonthDayYear => format!("{} {}, {}", month, date.day(), date.year()),
            DateOrder::DayMonthYear => format!("{} {} {}", date.day(), month, date.year()),
        }
    }
}

pub static DATE_FORMATS: &[DateFormat] = &[
    DateFormat {
        locale: "en",
        months: [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ],
        order: DateOrder::MonthDayYear,
    },
    DateFormat {
        locale: "ru",
        // Genitive case, as used after a day number.
        months: [
            "января",
            "февраля",
            "марта",
            "апреля",
            "мая",
            "июня",
            "июля",
            "августа",
            "сентября",
            "октября",
            "ноября",
            "декабря",
        ],
        order: DateOrder::DayMonthYear,
    },
];

pub fn date_format(locale: &str) -> Option<&'static DateFormat> {
    DATE_FORMATS.iter().find(|f| f.locale == locale)
}

/// Long-form date for `locale`, falling back to ISO for unknown locales.
pub fn human_date(date: NaiveDate, locale: &str) -> String {
    match date_format(locale) {
        Some(format) => format.format(date),
        None => date.format("%Y-%m-%d").to_string(),
    }
}
