//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` in the project root.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── config.toml              # Optional, overrides stock defaults
//! ├── data/
//! │   ├── authors/1000/*.md
//! │   └── posts/1000/*.md
//! └── ssg/aux/
//!     ├── locales.json
//!     ├── assets/
//!     ├── favicon/
//!     └── about/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "screenshot"
//! base_url = "https://screenshot.report"
//! # repository_url = "https://github.com/owner/repo"
//! locales = ["en", "ru"]
//! default_locale = "en"
//! record_extension = "md"
//! asset_version = 16
//! stylesheets = ["/assets/pico.min.css", "/assets/my.css"]
//!
//! [paths]
//! authors = "data/authors"
//! posts = "data/posts"
//! locale_strings = "ssg/aux/locales.json"
//! assets = "ssg/aux/assets"
//! favicon = "ssg/aux/favicon"
//! about = "ssg/aux/about"
//! extra_files = ["ssg/aux/robots.txt", "ssg/aux/CNAME"]
//! output = "public"
//! ```
//!
//! Relative paths are resolved against the project root. Unknown keys are
//! rejected to catch typos early.

use crate::locale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. A user config need only specify the values it
/// wants to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title shown in the header.
    pub site_name: String,
    /// Absolute origin used for canonical links and the sitemap, no trailing slash.
    pub base_url: String,
    /// Optional source repository linked from the header.
    pub repository_url: Option<String>,
    /// Locales to build, in switcher order.
    pub locales: Vec<String>,
    /// Locale mirrored to the site root and used as `x-default`.
    pub default_locale: String,
    /// Extension of record files, without the dot.
    pub record_extension: String,
    /// Cache-busting version appended to favicon and manifest links.
    pub asset_version: u32,
    /// Stylesheet hrefs linked from every page.
    pub stylesheets: Vec<String>,
    /// Input and output locations.
    pub paths: PathsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "screenshot".to_string(),
            base_url: "https://screenshot.report".to_string(),
            repository_url: None,
            locales: vec!["en".to_string(), "ru".to_string()],
            default_locale: "en".to_string(),
            record_extension: "md".to_string(),
            asset_version: 16,
            stylesheets: vec![
                "/assets/pico.min.css".to_string(),
                "/assets/my.css".to_string(),
            ],
            paths: PathsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.locales.is_empty() {
            return Err(ConfigError::Validation("locales must not be empty".into()));
        }
        let mut seen = BTreeSet::new();
        for locale in &self.locales {
            if !seen.insert(locale.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "locale '{locale}' is listed twice"
                )));
            }
            if locale::date_format(locale).is_none() {
                return Err(ConfigError::Validation(format!(
                    "no date format for locale '{locale}'"
                )));
            }
        }
        if !self.locales.contains(&self.default_locale) {
            return Err(ConfigError::Validation(format!(
                "default_locale '{}' is not in locales",
                self.default_locale
            )));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must not end with '/'".into(),
            ));
        }
        if self.record_extension.is_empty() {
            return Err(ConfigError::Validation(
                "record_extension must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Absolute URL for a site path such as `/en/about/`.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Input and output locations, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub authors: PathBuf,
    pub posts: PathBuf,
    pub locale_strings: PathBuf,
    /// Copied to `<output>/assets/`.
    pub assets: PathBuf,
    /// Contents merged into the output root.
    pub favicon: PathBuf,
    /// Holds `about.<locale>.md` or `about.<locale>.html`.
    pub about: PathBuf,
    /// Single files copied into the output root.
    pub extra_files: Vec<PathBuf>,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            authors: "data/authors".into(),
            posts: "data/posts".into(),
            locale_strings: "ssg/aux/locales.json".into(),
            assets: "ssg/aux/assets".into(),
            favicon: "ssg/aux/favicon".into(),
            about: "ssg/aux/about".into(),
            extra_files: vec!["ssg/aux/robots.txt".into(), "ssg/aux/CNAME".into()],
            output: "public".into(),
        }
    }
}

impl PathsConfig {
    /// Make every path absolute by joining relative ones onto `root`.
    pub fn resolved(&self, root: &Path) -> PathsConfig {
        let join = |p: &PathBuf| root.join(p);
        PathsConfig {
            authors: join(&self.authors),
            posts: join(&self.posts),
            locale_strings: join(&self.locale_strings),
            assets: join(&self.assets),
            favicon: join(&self.favicon),
            about: join(&self.about),
            extra_files: self.extra_files.iter().map(join).collect(),
            output: join(&self.output),
        }
    }

    /// Reject an output directory that overlaps the project root or any input.
    ///
    /// The output directory is deleted at the start of every build, so it may
    /// neither contain the root or an input nor sit inside an input.
    pub fn check_output(&self, root: &Path) -> Result<(), ConfigError> {
        let root = normalize(&std::path::absolute(root)?);
        let paths = self.resolved(&root);
        let output = normalize(&paths.output);

        if root.starts_with(&output) {
            return Err(ConfigError::Validation(format!(
                "output directory {} contains the project root",
                output.display()
            )));
        }

        let inputs = [
            &paths.authors,
            &paths.posts,
            &paths.locale_strings,
            &paths.assets,
            &paths.favicon,
            &paths.about,
        ]
        .into_iter()
        .chain(&paths.extra_files);
        for input in inputs {
            let input = normalize(input);
            if input.starts_with(&output) || output.starts_with(&input) {
                return Err(ConfigError::Validation(format!(
                    "output directory {} overlaps input {}",
                    output.display(),
                    input.display()
                )));
            }
        }
        Ok(())
    }
}

/// Resolve `.` and `..` lexically, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML value, the base every user config merges onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Prediction Ledger Configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the project root. Relative paths are resolved
# against that directory. Unknown keys will cause an error.

# Site title shown in the page header.
site_name = "screenshot"

# Absolute origin for canonical links and the sitemap (no trailing slash).
base_url = "https://screenshot.report"

# Source repository linked from the header. Omit to hide the link.
# repository_url = "https://github.com/owner/repo"

# Locales to build, in the order the switcher lists them.
# Every locale needs a date format and a full set of UI strings.
locales = ["en", "ru"]

# Locale mirrored to /index.html and used as the sitemap x-default.
default_locale = "en"

# Extension of record files under the authors and posts directories.
record_extension = "md"

# Cache-busting version appended to favicon and manifest links (?v=16).
asset_version = 16

# Stylesheets linked from every page, in order.
stylesheets = ["/assets/pico.min.css", "/assets/my.css"]

# ---------------------------------------------------------------------------
# Paths
# ---------------------------------------------------------------------------
[paths]
# Record trees, grouped into <bucket>/<id>.<ext> files.
authors = "data/authors"
posts = "data/posts"

# Nested JSON of UI strings: { "key": { "en": "...", "ru": "..." } }.
locale_strings = "ssg/aux/locales.json"

# Copied to <output>/assets/.
assets = "ssg/aux/assets"

# Contents merged into the output root (favicon.ico, manifest, ...).
favicon = "ssg/aux/favicon"

# Holds about.<locale>.md (rendered as Markdown) or about.<locale>.html.
about = "ssg/aux/about"

# Single files copied into the output root.
extra_files = ["ssg/aux/robots.txt", "ssg/aux/CNAME"]

# Build output. Deleted and recreated on every build.
output = "public"
"##
}
