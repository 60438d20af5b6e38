//! Shared test utilities.
//!
//! Provides fixture setup plus small builders for in-memory posts and
//! authors, so statistics and rendering tests do not need files on disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = generate::build(tmp.path(), &config).unwrap();
//!
//! let p = dated(post("1", "ann", Status::Awaiting, Regular, Careful), Some("2024-01-01"), None, None);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::locale::{LocaleStrings, REQUIRED_KEYS};
use crate::types::{Author, Complexity, Confidence, Localized, Post, Status};
use chrono::NaiveDate;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// In-memory builders
// =========================================================================

/// A post with English text derived from its id and no dates.
pub fn post(
    id: &str,
    author_id: &str,
    status: Status,
    complexity: Complexity,
    confidence: Confidence,
) -> Post {
    Post {
        id: id.to_string(),
        author_id: author_id.to_string(),
        title: Localized::default(),
        statement: [("en", format!("Statement {id}")), ("ru", format!("Прогноз {id}"))]
            .into_iter()
            .collect(),
        context: Localized::default(),
        notes: Localized::default(),
        status,
        complexity,
        confidence,
        original_language: "en".to_string(),
        time_statement: None,
        time_awaiting: None,
        time_verified: None,
    }
}

/// Set the three dates of a post from ISO strings.
pub fn dated(
    mut post: Post,
    statement: Option<&str>,
    awaiting: Option<&str>,
    verified: Option<&str>,
) -> Post {
    let parse = |s: Option<&str>| s.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap());
    post.time_statement = parse(statement);
    post.time_awaiting = parse(awaiting);
    post.time_verified = parse(verified);
    post
}

/// An author named after its id, owning `posts`. Stat is left empty.
pub fn author_with_posts(id: &str, posts: Vec<Post>) -> Author {
    Author {
        id: id.to_string(),
        name: [("en", format!("Author {id}")), ("ru", format!("Автор {id}"))]
            .into_iter()
            .collect(),
        description: [("en", format!("About {id}")), ("ru", format!("Об {id}"))]
            .into_iter()
            .collect(),
        posts,
        stat: Default::default(),
    }
}

/// Locale strings where every required key reads `<key>:<locale>`.
pub fn echo_strings(locales: &[&str]) -> LocaleStrings {
    let mut strings = LocaleStrings::default();
    for key in REQUIRED_KEYS {
        for locale in locales {
            strings.insert(key, locale, &format!("{key}:{locale}"));
        }
    }
    strings
}
