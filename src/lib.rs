//! # Prediction Ledger
//!
//! A static site generator for a public ledger of predictions and the people
//! who made them. Authors and predictions are plain-text records on disk;
//! each build scores the verified predictions, rates every author, and renders
//! a complete multi-locale HTML site with a sitemap.
//!
//! # Pipeline
//!
//! ```text
//! 1. Parse     data/authors, data/posts  →  records      (field blocks → maps)
//! 2. Assemble  records                   →  corpus       (typed, attached, scored)
//! 3. Render    corpus × locales          →  public/      (HTML, fragments, sitemap)
//! ```
//!
//! Every build is from scratch: the output directory is cleared first, and
//! nothing is cached between runs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`record`] | `### field` block parser, directory walk, skipped-record bookkeeping |
//! | [`types`] | `Post`, `Author`, and the closed status / complexity / confidence vocabularies |
//! | [`stats`] | Scoring table, Bayesian rating, aggregate statistics |
//! | [`ranking`] | View filters, feed ordering, rating and volume rankings, pagination |
//! | [`locale`] | UI string table and per-locale date formatting |
//! | [`render`] | Maud page templates and route helpers |
//! | [`generate`] | Orchestrates a full build into the output directory |
//! | [`sitemap`] | `sitemap.xml` with `hreflang` alternates |
//! | [`intake`] | Saves issue submissions as the next numbered record |
//! | [`naming`] | Bucket directory and record file name conventions |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting for `build` and `check` |
//!
//! # Design Decisions
//!
//! ## Escape Once, At Parse Time
//!
//! Record values are HTML-escaped when a record is parsed and travel through
//! the rest of the pipeline escaped. Templates insert them with
//! `PreEscaped`; URL autolinking runs on the escaped text. This keeps the
//! markup identical across locales and means no template can double-escape.
//!
//! ## Ratings Are Smoothed
//!
//! An author's rating is a Bayesian average that starts at the neutral prior
//! ([`stats::PRIOR_MEAN`]) and moves toward their real mean as verified
//! predictions accumulate. Authors below [`stats::MIN_VERIFIED`] verified
//! predictions are still shown, but their rating is muted and they are left
//! out of the ranking table.
//!
//! ## Deterministic Output
//!
//! Registries are ordered maps and directory walks are sorted, so two builds
//! of the same records produce byte-identical sites.
//!
//! ## Infinite Scroll Without a Server
//!
//! Site-wide feeds render their first page as a full document and every
//! later page as a bare `<n>.html` fragment beside it. A few lines of
//! embedded JavaScript fetch and append fragments as the reader scrolls.

pub mod config;
pub mod generate;
pub mod intake;
pub mod locale;
pub mod naming;
pub mod output;
pub mod ranking;
pub mod record;
pub mod render;
pub mod sitemap;
pub mod stats;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
