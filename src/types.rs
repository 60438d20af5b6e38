//! Domain types shared by the parser, the statistics engine and the renderer.
//!
//! Records arrive as loose `field → value` maps (see [`crate::record`]); this
//! module holds the typed shapes they are converted into. All free-text values
//! stored here are already HTML-escaped by the parser.

use crate::stats::{self, Score, Stat};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A field held a value outside its closed vocabulary.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {field} value '{value}'")]
pub struct InvalidValue {
    pub field: &'static str,
    pub value: String,
}

/// Lifecycle state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Awaiting,
    Completely,
    Almost,
    DidNot,
    Unverifiable,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Awaiting,
        Status::Completely,
        Status::Almost,
        Status::DidNot,
        Status::Unverifiable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Awaiting => "awaiting",
            Status::Completely => "completely",
            Status::Almost => "almost",
            Status::DidNot => "didnot",
            Status::Unverifiable => "unverifiable",
        }
    }

    /// Everything except `awaiting` counts as verified.
    pub fn is_verified(self) -> bool {
        self != Status::Awaiting
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Completely | Status::Almost)
    }

    /// CSS token for status badges.
    pub fn badge_color(self) -> &'static str {
        match self {
            Status::Awaiting | Status::Unverifiable => "g",
            Status::Completely | Status::Almost => "p",
            Status::DidNot => "r",
        }
    }

    /// CSS token for heatmap cells (misses get a stronger red).
    pub fn heatmap_color(self) -> &'static str {
        match self {
            Status::Awaiting | Status::Unverifiable => "g",
            Status::Completely | Status::Almost => "p",
            Status::DidNot => "rh",
        }
    }
}

impl FromStr for Status {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidValue {
                field: "status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Complexity {
    Regular,
    Complex,
}

impl Complexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Regular => "regular",
            Complexity::Complex => "complex",
        }
    }
}

impl FromStr for Complexity {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Complexity::Regular),
            "complex" => Ok(Complexity::Complex),
            other => Err(InvalidValue {
                field: "complexity",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    Confident,
    Careful,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Confident => "confident",
            Confidence::Careful => "careful",
        }
    }
}

impl FromStr for Confidence {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confident" => Ok(Confidence::Confident),
            "careful" => Ok(Confidence::Careful),
            other => Err(InvalidValue {
                field: "confidence",
                value: other.to_string(),
            }),
        }
    }
}

/// Per-locale text, keyed by locale tag. Missing locales read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Localized(BTreeMap<String, String>);

impl Localized {
    pub fn get(&self, locale: &str) -> &str {
        self.0.get(locale).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        self.0.insert(locale.into(), text.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Localized {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Localized(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A single verifiable prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: Localized,
    pub statement: Localized,
    pub context: Localized,
    pub notes: Localized,
    pub status: Status,
    pub complexity: Complexity,
    pub confidence: Confidence,
    pub original_language: String,
    pub time_statement: Option<NaiveDate>,
    pub time_awaiting: Option<NaiveDate>,
    pub time_verified: Option<NaiveDate>,
}

impl Post {
    /// Scoring breakdown for this post; `None` while awaiting or when the
    /// claim cannot be checked.
    pub fn score(&self) -> Option<Score> {
        stats::score(self.status, self.complexity, self.confidence)
    }
}

/// A person whose predictions are tracked.
///
/// `posts` and `stat` start empty and are filled in during assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: String,
    pub name: Localized,
    pub description: Localized,
    pub posts: Vec<Post>,
    pub stat: Stat,
}
