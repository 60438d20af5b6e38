//! Site assembly.
//!
//! Drives the full build: records on disk in, a static file tree out. Every
//! run starts from an empty output directory.
//!
//! ## Stages
//!
//! 1. Clear the output root and copy static inputs (assets, favicon, extra files)
//! 2. Load and validate locale strings
//! 3. Parse author and post records
//! 4. Attach posts to authors; an unknown author id aborts the build
//! 5. Compute per-author and site-wide statistics
//! 6. Post pages, per locale
//! 7. Author pages, three views per locale
//! 8. Site-wide feeds (paginated) and the ranking page, mirrored to `/index.html`
//!    for the default locale
//! 9. Authors index and about page, per locale
//! 10. `sitemap.xml`
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── index.html                 # Ranking page, default locale
//! ├── sitemap.xml
//! ├── robots.txt, CNAME, favicon files
//! ├── assets/
//! └── en/
//!     ├── index.html             # Ranking page
//!     ├── about/index.html
//!     ├── authors/index.html
//!     ├── new/index.html         # Feed page 1
//!     ├── new/2.html             # Feed fragments
//!     ├── awaiting/...
//!     ├── verified/...
//!     └── 7/
//!         ├── index.html         # Author, "new" view
//!         ├── awaiting/index.html
//!         ├── verified/index.html
//!         └── 42/index.html      # Post
//! ```
//!
//! Bad records are logged and skipped; any write failure aborts the build.

use crate::config::{ConfigError, PathsConfig, SiteConfig};
use crate::locale::{LocaleError, LocaleStrings};
use crate::ranking::{PAGE_SIZE, ViewFilter, paginate, rank_by_rating, rank_by_volume};
use crate::record::{Record, RecordError, RecordSet, SkippedRecord, parse_dir};
use crate::render::{
    self, ABOUT_ROUTE, AUTHORS_ROUTE, Entry, HOME_ROUTE, RenderContext, author_route, feed_route,
    post_route,
};
use crate::sitemap::generate_sitemap;
use crate::stats::{Stat, calc_stat};
use crate::types::{Author, Post};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
    #[error("Post {post} references unknown author '{author}'")]
    UnknownAuthor { post: String, author: String },
}

/// Parsed records with posts attached and statistics computed.
#[derive(Debug, Default)]
pub struct Corpus {
    pub authors: BTreeMap<String, Author>,
    /// Site-wide statistics over every post.
    pub stat: Stat,
    pub skipped: Vec<SkippedRecord>,
}

impl Corpus {
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.authors.values().flat_map(|a| a.posts.iter())
    }

    pub fn post_count(&self) -> usize {
        self.authors.values().map(|a| a.posts.len()).sum()
    }

    /// Posts of one site-wide view, paired with their authors.
    pub fn feed(&self, view: ViewFilter) -> Vec<Entry<'_>> {
        view.apply(self.posts())
            .into_iter()
            .filter_map(|post| self.authors.get(&post.author_id).map(|a| (post, a)))
            .collect()
    }
}

/// One line of the rating table, for the build summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAuthor {
    pub id: String,
    pub name: String,
    pub rating: String,
    pub verified: usize,
}

/// What a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub output: PathBuf,
    pub authors: usize,
    pub posts: usize,
    /// Full pages written, per locale.
    pub pages: BTreeMap<String, usize>,
    /// Feed fragments (`<n>.html`) written across all locales.
    pub fragments: usize,
    /// Files copied from static inputs.
    pub static_files: usize,
    pub ranking: Vec<RankedAuthor>,
    pub skipped: Vec<SkippedRecord>,
}

// ============================================================================
// Entry points
// ============================================================================

/// Run the full build for the project at `root`.
pub fn build(root: &Path, config: &SiteConfig) -> Result<BuildReport, GenerateError> {
    config.paths.check_output(root)?;
    let paths = config.paths.resolved(root);

    info!("Preparing {}", paths.output.display());
    reset_output(&paths.output)?;
    let static_files = copy_static_inputs(&paths)?;

    info!("Loading locale strings from {}", paths.locale_strings.display());
    let strings = load_strings(&paths, config)?;

    let corpus = load_corpus(&paths, config)?;
    info!(
        "Loaded {} authors and {} posts ({} skipped)",
        corpus.authors.len(),
        corpus.post_count(),
        corpus.skipped.len()
    );

    let mut site = SiteWriter::new(&paths.output);
    for locale in &config.locales {
        let ctx = RenderContext::new(config, &strings, locale);
        info!("Rendering locale {}", locale);
        write_locale(&mut site, &ctx, &corpus, &paths)?;
    }

    let sitemap = generate_sitemap(config, corpus.authors.values());
    fs::write(paths.output.join("sitemap.xml"), sitemap)?;
    debug!("Wrote sitemap.xml");

    let ranking = rank_by_rating(corpus.authors.values())
        .into_iter()
        .map(|a| RankedAuthor {
            id: a.id.clone(),
            name: a.name.get(&config.default_locale).to_string(),
            rating: a.stat.rating_label(),
            verified: a.stat.total_verified,
        })
        .collect();

    Ok(BuildReport {
        output: paths.output,
        authors: corpus.authors.len(),
        posts: corpus.post_count(),
        pages: site.pages,
        fragments: site.fragments,
        static_files,
        ranking,
        skipped: corpus.skipped,
    })
}

/// Load, validate and assemble everything without writing output.
pub fn check(root: &Path, config: &SiteConfig) -> Result<Corpus, GenerateError> {
    let paths = config.paths.resolved(root);
    load_strings(&paths, config)?;
    load_corpus(&paths, config)
}

// ============================================================================
// Loading
// ============================================================================

fn load_strings(paths: &PathsConfig, config: &SiteConfig) -> Result<LocaleStrings, GenerateError> {
    let strings = LocaleStrings::load(&paths.locale_strings)?;
    if strings.is_empty() {
        warn!("No strings in {}", paths.locale_strings.display());
    }
    debug!("Loaded {} locale strings", strings.len());
    strings.validate(&config.locales)?;
    Ok(strings)
}

/// Parse both record trees, attach posts to authors and compute statistics.
pub fn load_corpus(paths: &PathsConfig, config: &SiteConfig) -> Result<Corpus, GenerateError> {
    let locales = &config.locales;
    let ext = &config.record_extension;

    let mut author_set = parse_dir(&paths.authors, ext);
    let mut post_set = parse_dir(&paths.posts, ext);

    let authors = convert(&mut author_set, "author", |r| r.to_author(locales));
    let posts = convert(&mut post_set, "post", |r| r.to_post(locales));

    let mut authors: BTreeMap<String, Author> =
        authors.into_iter().map(|a| (a.id.clone(), a)).collect();
    attach_posts(&mut authors, posts)?;

    for author in authors.values_mut() {
        author.stat = calc_stat(&author.posts);
    }
    let stat = calc_stat(authors.values().flat_map(|a| a.posts.iter()));

    let mut skipped = author_set.skipped;
    skipped.extend(post_set.skipped);

    Ok(Corpus {
        authors,
        stat,
        skipped,
    })
}

/// Convert every record of a set, moving failures into the set's skip list.
fn convert<T>(
    set: &mut RecordSet,
    kind: &str,
    to_entity: impl Fn(&Record) -> Result<T, RecordError>,
) -> Vec<T> {
    let mut converted = Vec::new();
    let mut failures = Vec::new();
    for (id, record) in &set.records {
        match to_entity(record) {
            Ok(entity) => converted.push(entity),
            Err(e) => {
                let path = set.sources.get(id).cloned().unwrap_or_default();
                failures.push((path, format!("{kind} {id}: {e}")));
            }
        }
    }
    for (path, reason) in failures {
        set.skip(path, reason);
    }
    converted
}

fn attach_posts(
    authors: &mut BTreeMap<String, Author>,
    posts: Vec<Post>,
) -> Result<(), GenerateError> {
    for post in posts {
        match authors.get_mut(&post.author_id) {
            Some(author) => author.posts.push(post),
            None => {
                return Err(GenerateError::UnknownAuthor {
                    post: post.id,
                    author: post.author_id,
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Static inputs
// ============================================================================

fn reset_output(output: &Path) -> Result<(), GenerateError> {
    if output.exists() {
        fs::remove_dir_all(output)?;
    }
    fs::create_dir_all(output)?;
    Ok(())
}

/// Copy assets, favicon files and extra files. Missing inputs are skipped.
fn copy_static_inputs(paths: &PathsConfig) -> Result<usize, GenerateError> {
    let mut copied = 0;

    if paths.assets.is_dir() {
        copied += copy_tree(&paths.assets, &paths.output.join("assets"))?;
    } else {
        warn!("No assets directory at {}", paths.assets.display());
    }

    if paths.favicon.is_dir() {
        copied += copy_tree(&paths.favicon, &paths.output)?;
    } else {
        warn!("No favicon directory at {}", paths.favicon.display());
    }

    for file in &paths.extra_files {
        match file.file_name() {
            Some(name) if file.is_file() => {
                fs::copy(file, paths.output.join(name))?;
                copied += 1;
            }
            _ => warn!("Skipping missing file {}", file.display()),
        }
    }

    Ok(copied)
}

/// Copy the contents of `src` into `dst`, merging with what is there.
fn copy_tree(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// Pages
// ============================================================================

/// Writes pages under `<output>/<locale>/` and counts them.
struct SiteWriter {
    output: PathBuf,
    pages: BTreeMap<String, usize>,
    fragments: usize,
}

impl SiteWriter {
    fn new(output: &Path) -> Self {
        Self {
            output: output.to_path_buf(),
            pages: BTreeMap::new(),
            fragments: 0,
        }
    }

    fn route_dir(&self, locale: &str, route: &str) -> PathBuf {
        let mut dir = self.output.join(locale);
        let trimmed = route.trim_matches('/');
        if !trimmed.is_empty() {
            dir.push(trimmed);
        }
        dir
    }

    /// Write `<locale><route>index.html`.
    fn page(&mut self, locale: &str, route: &str, html: &str) -> Result<PathBuf, GenerateError> {
        let dir = self.route_dir(locale, route);
        fs::create_dir_all(&dir)?;
        let path = dir.join("index.html");
        fs::write(&path, html)?;
        debug!("Wrote {}", path.display());
        *self.pages.entry(locale.to_string()).or_default() += 1;
        Ok(path)
    }

    /// Write `<locale><route><number>.html`.
    fn fragment(
        &mut self,
        locale: &str,
        route: &str,
        number: usize,
        html: &str,
    ) -> Result<(), GenerateError> {
        let dir = self.route_dir(locale, route);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{number}.html"));
        fs::write(&path, html)?;
        debug!("Wrote {}", path.display());
        self.fragments += 1;
        Ok(())
    }
}

fn write_locale(
    site: &mut SiteWriter,
    ctx: &RenderContext,
    corpus: &Corpus,
    paths: &PathsConfig,
) -> Result<(), GenerateError> {
    let locale = ctx.locale;

    // Posts and authors
    for author in corpus.authors.values() {
        for post in &author.posts {
            let html = render::render_post_page(ctx, post, author);
            site.page(locale, &post_route(&author.id, &post.id), &html.into_string())?;
        }
        for view in ViewFilter::ALL {
            let posts = view.apply(&author.posts);
            let html = render::render_author_page(ctx, author, view, &posts);
            site.page(locale, &author_route(&author.id, view), &html.into_string())?;
        }
    }

    // Site-wide feeds
    for view in ViewFilter::ALL {
        let feed = corpus.feed(view);
        let pages = paginate(&feed, PAGE_SIZE);
        let first: &[Entry] = pages.first().copied().unwrap_or(&[]);
        let route = feed_route(view);

        let html = render::render_feed_page(ctx, view, &corpus.stat, first, pages.len().max(1));
        site.page(locale, &route, &html.into_string())?;

        for (index, page) in pages.iter().enumerate().skip(1) {
            let html = render::render_feed_fragment(ctx, view, page);
            site.fragment(locale, &route, index + 1, &html.into_string())?;
        }
    }

    // Ranking home
    let ranking = rank_by_rating(corpus.authors.values());
    let html = render::render_ranking_page(ctx, &corpus.stat, &ranking).into_string();
    site.page(locale, HOME_ROUTE, &html)?;
    if locale == ctx.config.default_locale {
        fs::write(site.output.join("index.html"), &html)?;
        debug!("Mirrored {} ranking page to index.html", locale);
    }

    // Authors index and about
    let by_volume = rank_by_volume(corpus.authors.values());
    let html = render::render_authors_page(ctx, &corpus.stat, &by_volume);
    site.page(locale, AUTHORS_ROUTE, &html.into_string())?;

    let body = about_body(&paths.about, locale)?;
    let html = render::render_about_page(ctx, &body);
    site.page(locale, ABOUT_ROUTE, &html.into_string())?;

    Ok(())
}

/// About copy for a locale: `about.<l>.md` as Markdown, else `about.<l>.html`
/// verbatim, else empty.
fn about_body(dir: &Path, locale: &str) -> Result<String, GenerateError> {
    let markdown = dir.join(format!("about.{locale}.md"));
    if markdown.is_file() {
        return Ok(render::markdown_to_html(&fs::read_to_string(markdown)?));
    }
    let html = dir.join(format!("about.{locale}.html"));
    if html.is_file() {
        return Ok(fs::read_to_string(html)?);
    }
    warn!("No about page for locale {} in {}", locale, dir.display());
    Ok(String::new())
}

// ============================================================================
// Tests
// ============================================================================
