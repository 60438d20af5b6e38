//! HTML rendering.
//!
//! Pure transforms from parsed records, statistics and a locale to markup.
//! Nothing here touches the filesystem; [`crate::generate`] decides where the
//! results are written.
//!
//! ## Pages
//!
//! - **Ranking** (`/<l>/`): global stat block, rating table, rating note
//! - **Feeds** (`/<l>/new/`, `/<l>/awaiting/`, `/<l>/verified/`): first page of
//!   posts plus the infinite-scroll script; later pages are bare fragments
//! - **Authors** (`/<l>/authors/`): every author with post counts
//! - **Author** (`/<l>/<author>/[awaiting/|verified/]`): stat block, heatmap
//!   and that author's posts in one of three views
//! - **Post** (`/<l>/<author>/<post>/`): full post with notes and scoring
//! - **About** (`/<l>/about/`): static copy
//!
//! ## Escaping
//!
//! Record values arrive HTML-escaped from [`crate::record`] and locale strings
//! are trusted markup, so both are inserted with [`PreEscaped`]. Anything else
//! (numbers, dates, config values) goes through maud's normal escaping.
//!
//! ## JavaScript
//!
//! `static/feed.js` is embedded at compile time and reads the page count from
//! its own `data-pages` attribute.

use crate::config::SiteConfig;
use crate::locale::{LocaleStrings, human_date};
use crate::ranking::{ViewFilter, chronological};
use crate::stats::{Stat, StatField, signed};
use crate::types::{Author, Post, Status};
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use regex::Regex;
use std::sync::LazyLock;

const FEED_JS: &str = include_str!("../static/feed.js");
const REPOSITORY_ICON: &str = include_str!("../static/github.svg");

/// Longest statement + context still used as a post page title.
pub const TITLE_LIMIT: usize = 120;

/// Stat cells on site-wide pages.
pub const SITE_STAT_FIELDS: [StatField; 4] = [
    StatField::TotalAuthors,
    StatField::TotalPosts,
    StatField::TotalVerified,
    StatField::SuccessPct,
];

/// Stat cells on author pages.
pub const AUTHOR_STAT_FIELDS: [StatField; 4] = [
    StatField::TotalPosts,
    StatField::TotalVerified,
    StatField::SuccessPct,
    StatField::Rating,
];

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s\])<>"']+"#).expect("url pattern is valid"));

/// A post together with its author, as listed in feeds.
pub type Entry<'a> = (&'a Post, &'a Author);

// ============================================================================
// Routes
// ============================================================================

/// Routes are locale-relative paths with a trailing slash; [`RenderContext::link`]
/// prefixes the locale.
pub const HOME_ROUTE: &str = "/";
pub const AUTHORS_ROUTE: &str = "/authors/";
pub const ABOUT_ROUTE: &str = "/about/";

pub fn feed_route(view: ViewFilter) -> String {
    format!("/{}/", view.slug())
}

pub fn author_route(author_id: &str, view: ViewFilter) -> String {
    match view {
        ViewFilter::New => format!("/{author_id}/"),
        other => format!("/{author_id}/{}/", other.slug()),
    }
}

pub fn post_route(author_id: &str, post_id: &str) -> String {
    format!("/{author_id}/{post_id}/")
}

// ============================================================================
// Context
// ============================================================================

/// Everything a renderer needs besides the data itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub strings: &'a LocaleStrings,
    pub locale: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a SiteConfig, strings: &'a LocaleStrings, locale: &'a str) -> Self {
        Self {
            config,
            strings,
            locale,
        }
    }

    /// Raw locale string.
    pub fn text(&self, key: &'static str) -> &'a str {
        self.strings.get(key, self.locale)
    }

    /// Locale string ready for insertion into markup.
    fn t(&self, key: &'static str) -> PreEscaped<&'a str> {
        PreEscaped(self.text(key))
    }

    /// Site-absolute href for a route in the current locale.
    fn link(&self, route: &str) -> PreEscaped<String> {
        PreEscaped(format!("/{}{}", self.locale, route))
    }

    fn date(&self, date: NaiveDate) -> String {
        human_date(date, self.locale)
    }
}

/// Which header badge is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Ranking,
    Predictions,
    Authors,
    None,
}

/// Per-page head and header parameters.
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// Document title. May contain escaped record text.
    pub title: String,
    /// Route of this page, used by the locale switcher and `hreflang` links.
    pub route: String,
    /// Route of the canonical version of this page.
    pub canonical: String,
    pub section: Section,
}

impl PageMeta {
    pub fn new(title: impl Into<String>, route: impl Into<String>, section: Section) -> Self {
        let route = route.into();
        Self {
            title: title.into(),
            canonical: route.clone(),
            route,
            section,
        }
    }

    fn shows_to_top(&self) -> bool {
        self.route != HOME_ROUTE && self.route != ABOUT_ROUTE
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Turn bare URLs in already-escaped text into anchors.
///
/// Input must already be HTML-escaped; it is not escaped again. A URL stops at
/// whitespace, `]`, `)`, quotes, or an escaped `<`, `>` or `"`.
pub fn autolink(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;
    for m in URL_RE.find_iter(escaped) {
        let url = cut_at_entity(m.as_str());
        out.push_str(&escaped[last..m.start()]);
        out.push_str(&format!(
            r#"<a class="o" href="{url}" target="_blank" rel="noopener">{url}</a>"#
        ));
        last = m.start() + url.len();
    }
    out.push_str(&escaped[last..]);
    out
}

fn cut_at_entity(url: &str) -> &str {
    ["&lt;", "&gt;", "&quot;"]
        .iter()
        .filter_map(|entity| url.find(entity))
        .min()
        .map_or(url, |end| &url[..end])
}

/// Statement body: line breaks become `<br>`, trailing dots are dropped.
pub fn statement_html(text: &str) -> String {
    text.replace('\n', "<br>").trim_end_matches('.').to_string()
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

/// `<title>` of a post page.
///
/// `title | author` when the post has a title; `statement | context | author`
/// when those are short enough; otherwise `author | date`.
pub fn post_page_title(post: &Post, author: &Author, locale: &str) -> String {
    let name = author.name.get(locale);
    let title = post.title.get(locale);
    if !title.is_empty() {
        return format!("{title} | {name}");
    }

    let statement = post.statement.get(locale);
    let context = post.context.get(locale);
    if statement.chars().count() + context.chars().count() <= TITLE_LIMIT {
        let mut out = statement.trim_end_matches('.').to_string();
        if !context.is_empty() {
            out.push_str(" | ");
            out.push_str(context.trim_end_matches('.'));
        }
        out.push_str(" | ");
        out.push_str(name);
        out
    } else {
        let date = post.time_statement.map(iso_date).unwrap_or_default();
        format!("{name} | {date}")
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn badge(active: bool) -> &'static str {
    if active { "p" } else { "w" }
}

fn view_title_key(view: ViewFilter) -> &'static str {
    match view {
        ViewFilter::New => "titles.new",
        ViewFilter::Awaiting => "titles.awaiting",
        ViewFilter::Verified => "titles.verified",
    }
}

fn view_label_key(view: ViewFilter) -> &'static str {
    match view {
        ViewFilter::New => "sf.new",
        ViewFilter::Awaiting => "sf.awaiting",
        ViewFilter::Verified => "sf.verified",
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the full document around a page body.
pub fn base_document(ctx: &RenderContext, meta: &PageMeta, content: Markup) -> Markup {
    let config = ctx.config;
    let version = config.asset_version;
    let canonical = config.absolute_url(&format!("/{}{}", ctx.locale, meta.canonical));

    html! {
        (DOCTYPE)
        html lang=(ctx.locale) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PreEscaped(&meta.title)) }
                link rel="canonical" href=(PreEscaped(canonical));
                @for locale in &config.locales {
                    link rel="alternate" hreflang=(locale)
                        href=(PreEscaped(config.absolute_url(&format!("/{}{}", locale, meta.route))));
                }
                link rel="icon" href={ "/favicon.ico?v=" (version) } sizes="32x32";
                link rel="icon" href={ "/icon.svg?v=" (version) } type="image/svg+xml";
                link rel="apple-touch-icon" href={ "/apple-touch-icon.png?v=" (version) };
                link rel="manifest" href={ "/manifest.webmanifest?v=" (version) };
                @for stylesheet in &config.stylesheets {
                    link rel="stylesheet" href=(stylesheet);
                }
            }
            body.bgc {
                (site_header(ctx, meta))
                main.container {
                    section.grid {
                        div id="abc" {
                            (content)
                        }
                    }
                }
                @if meta.shows_to_top() {
                    a.to-top onclick="window.scrollTo({top: 0})" aria-label="up" { "↑" }
                }
            }
        }
    }
}

/// Site name, tagline, locale switcher and section badges.
fn site_header(ctx: &RenderContext, meta: &PageMeta) -> Markup {
    let config = ctx.config;
    html! {
        header.container {
            article style="position: relative;" {
                h1 style="margin-bottom:0;" {
                    a href={ "/" (ctx.locale) "/" } { (config.site_name) }
                }
                p.fnav style="margin-bottom:0; margin-top:0;" {
                    (ctx.t("ppm")) " "
                    span.no-break {
                        @for locale in &config.locales {
                            @let current = locale == ctx.locale;
                            "| "
                            a class=[current.then_some("bold")]
                                href=(PreEscaped(format!("/{}{}", locale, meta.route))) { (locale) }
                            " "
                        }
                    }
                }
                p.fnav style="margin-bottom:0; margin-top:8px;" {
                    span {
                        a class={ "badge sec " (badge(meta.section == Section::Ranking)) }
                            href=(ctx.link(HOME_ROUTE)) { (ctx.t("rating")) }
                    }
                    " "
                    span {
                        a class={ "badge sec " (badge(meta.section == Section::Predictions)) }
                            href=(ctx.link(&feed_route(ViewFilter::New))) { (ctx.t("predictions")) }
                    }
                    " "
                    span {
                        a class={ "badge sec " (badge(meta.section == Section::Authors)) }
                            href=(ctx.link(AUTHORS_ROUTE)) { (ctx.t("authors")) }
                    }
                }
                @if let Some(repository) = &config.repository_url {
                    a.gh rel="noopener noreferrer" aria-label="Source repository"
                        href=(repository) target="_blank" {
                        (PreEscaped(REPOSITORY_ICON))
                    }
                }
            }
        }
    }
}

/// Label/value pairs of a [`Stat`]. The rating is muted while an author has
/// fewer than [`crate::stats::MIN_VERIFIED`] verified posts.
pub fn render_stat(ctx: &RenderContext, stat: &Stat, fields: &[StatField]) -> Markup {
    html! {
        div.stat {
            @for field in fields {
                @let value = stat.field(*field);
                div.itm {
                    div.hstat { (ctx.t(field.label_key())) }
                    div.nstat.bold {
                        @if *field == StatField::Rating && stat.is_rating_muted() {
                            span.g2 { (value) }
                        } @else {
                            (value)
                        }
                    }
                }
            }
        }
    }
}

/// One coloured cell per post, oldest first.
pub fn render_heatmap(ctx: &RenderContext, author: &Author) -> Markup {
    html! {
        div.heatmap {
            @for post in chronological(&author.posts) {
                a class={ "hmc " (post.status.heatmap_color()) }
                    href=(ctx.link(&post_route(&author.id, &post.id))) {}
            }
        }
    }
}

/// Rating table. Ratings at or above the prior mean are shown as positive.
pub fn render_ranking(ctx: &RenderContext, ranking: &[&Author]) -> Markup {
    html! {
        table {
            tbody {
                @for (i, author) in ranking.iter().enumerate() {
                    @let href = ctx.link(&author_route(&author.id, ViewFilter::New));
                    @let color = if author.stat.is_rating_positive() { "p" } else { "r" };
                    tr {
                        td width="1rem" { b { (i + 1) "." } }
                        td {
                            a.d href=(href) {
                                b { (PreEscaped(author.name.get(ctx.locale))) }
                                br;
                                small { (PreEscaped(author.description.get(ctx.locale))) }
                            }
                        }
                        td width="1rem" {
                            a.d href=(href) {
                                span class={ "badge rtg " (color) } {
                                    small { b { (author.stat.rating_label()) } }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Authors table: name, `(posts/verified)`, description.
pub fn render_authors(ctx: &RenderContext, authors: &[&Author]) -> Markup {
    html! {
        table {
            tbody {
                @for author in authors {
                    tr {
                        td {
                            a.d href=(ctx.link(&author_route(&author.id, ViewFilter::New))) {
                                b { (PreEscaped(author.name.get(ctx.locale))) }
                                " (" (author.stat.total_posts) "/" (author.stat.total_verified) ")"
                                br;
                                small { (PreEscaped(author.description.get(ctx.locale))) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// `<sup>orig → locale</sup>` when the post was written in another language.
fn cross_locale_marker(post: &Post, locale: &str) -> Markup {
    html! {
        @if !post.original_language.is_empty() && post.original_language != locale {
            sup { (PreEscaped(&post.original_language)) " → " (locale) }
        }
    }
}

/// Author, date and statement block shared by list items and detail pages.
fn post_head(ctx: &RenderContext, post: &Post, author: &Author) -> Markup {
    let context = post.context.get(ctx.locale);
    html! {
        hgroup {
            h4 {
                a href=(ctx.link(&author_route(&author.id, ViewFilter::New))) {
                    (PreEscaped(author.name.get(ctx.locale)))
                }
            }
            p {
                @if let Some(date) = post.time_statement {
                    time datetime=(iso_date(date)) { (ctx.date(date)) }
                    " "
                }
                (cross_locale_marker(post, ctx.locale))
            }
        }
        p {
            (PreEscaped(statement_html(post.statement.get(ctx.locale))))
            @if !context.trim().is_empty() {
                " "
                span.g2 { "(" (PreEscaped(context.trim_end_matches('.'))) ")" }
            }
        }
        small class={ "badge " (post.status.badge_color()) } {
            (ctx.t(post.status.as_str()))
        }
    }
}

/// Date badge for the post's current stage: awaiting-since or verified-on.
fn stage_badge(ctx: &RenderContext, post: &Post) -> Markup {
    let date = if post.status == Status::Awaiting {
        post.time_awaiting
    } else {
        post.time_verified
    };
    html! {
        @if let Some(date) = date {
            " "
            small class={ "badge " (post.status.badge_color()) } { (ctx.date(date)) }
        }
    }
}

/// A post card in a feed. The stage date badge only appears in the view it
/// belongs to.
pub fn render_post_item(
    ctx: &RenderContext,
    post: &Post,
    author: &Author,
    view: ViewFilter,
) -> Markup {
    let show_stage = match view {
        ViewFilter::New => false,
        ViewFilter::Awaiting => post.status == Status::Awaiting,
        ViewFilter::Verified => post.status != Status::Awaiting,
    };
    html! {
        article {
            (post_head(ctx, post, author))
            @if show_stage {
                (stage_badge(ctx, post))
            }
            a.linka href=(ctx.link(&post_route(&author.id, &post.id))) {}
        }
    }
}

/// Full post with notes and the scoring breakdown.
pub fn render_post(ctx: &RenderContext, post: &Post, author: &Author) -> Markup {
    let score = post.score();
    let notes = autolink(post.notes.get(ctx.locale)).replace('\n', "<br>");
    let label = |key: &'static str| ctx.text(key).to_lowercase();

    html! {
        article {
            (post_head(ctx, post, author))
            (stage_badge(ctx, post))
            hr;
            small {
                p {
                    b { (ctx.t("notes_refs")) }
                    br;
                    (PreEscaped(notes))
                }
            }
            small {
                p {
                    (ctx.t("params")) ": "
                    (PreEscaped(label(post.status.as_str())))
                    @if let Some(s) = score { " (" (signed(s.status)) ")" }
                    ", "
                    (PreEscaped(label(post.complexity.as_str())))
                    @if let Some(s) = score { " (" (signed(s.complexity)) ")" }
                    ", "
                    (PreEscaped(label(post.confidence.as_str())))
                    @if let Some(s) = score { " (" (signed(s.confidence)) ")" }
                    @if let Some(s) = score {
                        br;
                        (ctx.t("post_total")) " " (s.total())
                    }
                }
            }
        }
    }
}

/// Links switching between the three views of a listing.
fn view_switcher(ctx: &RenderContext, current: ViewFilter, route: impl Fn(ViewFilter) -> String) -> Markup {
    html! {
        p.fnav style="padding-left: 1em" {
            @for view in ViewFilter::ALL {
                a class={ "badge sec " (badge(view == current)) } href=(ctx.link(&route(view))) {
                    (ctx.t(view_label_key(view)))
                }
                " "
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

pub fn render_post_page(ctx: &RenderContext, post: &Post, author: &Author) -> Markup {
    let meta = PageMeta::new(
        post_page_title(post, author, ctx.locale),
        post_route(&author.id, &post.id),
        Section::None,
    );
    base_document(ctx, &meta, render_post(ctx, post, author))
}

/// One view of an author page. The canonical URL is always the default view.
pub fn render_author_page(
    ctx: &RenderContext,
    author: &Author,
    view: ViewFilter,
    posts: &[&Post],
) -> Markup {
    let view_title = match view {
        ViewFilter::New => ctx.text("titles.prpr"),
        other => ctx.text(view_title_key(other)),
    };
    let mut meta = PageMeta::new(
        format!("{} | {}", author.name.get(ctx.locale), view_title),
        author_route(&author.id, view),
        Section::None,
    );
    meta.canonical = author_route(&author.id, ViewFilter::New);

    let content = html! {
        article {
            hgroup {
                h4 { (PreEscaped(author.name.get(ctx.locale))) }
                p { (PreEscaped(author.description.get(ctx.locale))) }
            }
            hr;
            (render_stat(ctx, &author.stat, &AUTHOR_STAT_FIELDS))
            (render_heatmap(ctx, author))
        }
        (view_switcher(ctx, view, |v| author_route(&author.id, v)))
        @for post in posts {
            (render_post_item(ctx, post, author, view))
        }
    };
    base_document(ctx, &meta, content)
}

/// First page of a site-wide feed. `page_count` tells the scroll script how
/// many fragments exist.
pub fn render_feed_page(
    ctx: &RenderContext,
    view: ViewFilter,
    stat: &Stat,
    first_page: &[Entry],
    page_count: usize,
) -> Markup {
    let meta = PageMeta::new(ctx.text(view_title_key(view)), feed_route(view), Section::Predictions);
    let content = html! {
        script data-pages=(page_count) { (PreEscaped(FEED_JS)) }
        article {
            (render_stat(ctx, stat, &SITE_STAT_FIELDS))
        }
        (view_switcher(ctx, view, feed_route))
        (render_feed_fragment(ctx, view, first_page))
    };
    base_document(ctx, &meta, content)
}

/// Bare post cards for pages 2..N, appended to the feed by the scroll script.
pub fn render_feed_fragment(ctx: &RenderContext, view: ViewFilter, entries: &[Entry]) -> Markup {
    html! {
        @for (post, author) in entries {
            (render_post_item(ctx, post, author, view))
        }
    }
}

pub fn render_ranking_page(ctx: &RenderContext, stat: &Stat, ranking: &[&Author]) -> Markup {
    let meta = PageMeta::new(ctx.text("titles.ranking"), HOME_ROUTE, Section::Ranking);
    let content = html! {
        article {
            (render_stat(ctx, stat, &SITE_STAT_FIELDS))
        }
        article {
            (render_ranking(ctx, ranking))
            p { (ctx.t("about_notes.rtg_note")) }
            p {
                a.u href=(ctx.link(ABOUT_ROUTE)) { (ctx.t("about_notes.how_rating")) }
            }
        }
    };
    base_document(ctx, &meta, content)
}

pub fn render_authors_page(ctx: &RenderContext, stat: &Stat, authors: &[&Author]) -> Markup {
    let meta = PageMeta::new(ctx.text("titles.authors"), AUTHORS_ROUTE, Section::Authors);
    let content = html! {
        article {
            (render_stat(ctx, stat, &SITE_STAT_FIELDS))
        }
        article {
            (render_authors(ctx, authors))
        }
    };
    base_document(ctx, &meta, content)
}

/// About page around pre-rendered HTML.
pub fn render_about_page(ctx: &RenderContext, body_html: &str) -> Markup {
    let meta = PageMeta::new(ctx.text("titles.about"), ABOUT_ROUTE, Section::None);
    let content = html! {
        article {
            (PreEscaped(body_html))
        }
    };
    base_document(ctx, &meta, content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::escape_html;
    use crate::stats::calc_stat;
    use crate::test_helpers::{author_with_posts, dated, echo_strings, post};
    use crate::types::{Complexity, Confidence};

    fn config() -> SiteConfig {
        SiteConfig::default()
    }

    fn render(markup: Markup) -> String {
        markup.into_string()
    }

    fn scored(id: &str, status: Status) -> Post {
        post(id, "7", status, Complexity::Complex, Confidence::Confident)
    }

    // =========================================================================
    // autolink tests
    // =========================================================================

    #[test]
    fn autolink_wraps_bare_urls() {
        let out = autolink("see https://example.org/a and http://b.io.");
        assert!(out.contains(
            r#"<a class="o" href="https://example.org/a" target="_blank" rel="noopener">https://example.org/a</a>"#
        ));
        assert!(out.contains(r#"href="http://b.io.""#));
        assert!(out.starts_with("see "));
    }

    #[test]
    fn autolink_stops_at_brackets() {
        let out = autolink("[https://example.org/x] (https://example.org/y)");
        assert!(out.contains(r#"href="https://example.org/x""#));
        assert!(out.contains(r#"href="https://example.org/y""#));
        assert!(out.contains("</a>]"));
        assert!(out.contains("</a>)"));
    }

    #[test]
    fn escape_then_autolink_never_double_escapes() {
        let escaped = escape_html("a&b https://x.org/q?a=1&b=2 end");
        let out = autolink(&escaped);
        assert!(out.contains(r#"href="https://x.org/q?a=1&amp;b=2""#));
        assert!(out.starts_with("a&amp;b "));
        assert!(!out.contains("&amp;amp;"));
    }

    #[test]
    fn escape_then_autolink_never_leaks_markup() {
        let raw = r#"<script>alert(1)</script> https://evil.org/"><img src=x> tail"#;
        let out = autolink(&escape_html(raw));
        assert!(!out.contains("<script"));
        assert!(!out.contains("<img"));
        assert!(out.contains(r#"href="https://evil.org/""#));
        assert!(out.contains("&quot;&gt;&lt;img src=x&gt;"));
    }

    #[test]
    fn autolink_without_urls_is_identity() {
        assert_eq!(autolink("plain &amp; simple"), "plain &amp; simple");
    }

    // =========================================================================
    // text helper tests
    // =========================================================================

    #[test]
    fn statement_breaks_lines_and_drops_trailing_dots() {
        assert_eq!(statement_html("One.\nTwo..."), "One.<br>Two");
    }

    #[test]
    fn markdown_converts_to_html() {
        let html = markdown_to_html("# About\n\nSome *text*.");
        assert!(html.contains("<h1>About</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn post_title_prefers_explicit_title() {
        let mut p = scored("1", Status::Awaiting);
        p.title.insert("en", "Big call");
        let a = author_with_posts("7", vec![]);
        assert_eq!(post_page_title(&p, &a, "en"), "Big call | Author 7");
    }

    #[test]
    fn post_title_uses_short_statement_and_context() {
        let mut p = scored("1", Status::Awaiting);
        p.statement.insert("en", "Rates fall.");
        p.context.insert("en", "Interview.");
        let a = author_with_posts("7", vec![]);
        assert_eq!(
            post_page_title(&p, &a, "en"),
            "Rates fall | Interview | Author 7"
        );

        p.context.insert("en", "");
        assert_eq!(post_page_title(&p, &a, "en"), "Rates fall | Author 7");
    }

    #[test]
    fn post_title_falls_back_to_date_for_long_text() {
        let mut p = dated(scored("1", Status::Awaiting), Some("2024-03-01"), None, None);
        p.statement.insert("en", "x".repeat(100));
        p.context.insert("en", "y".repeat(21));
        let a = author_with_posts("7", vec![]);
        assert_eq!(post_page_title(&p, &a, "en"), "Author 7 | 2024-03-01");
    }

    // =========================================================================
    // component tests
    // =========================================================================

    #[test]
    fn base_document_head_links() {
        let config = config();
        let strings = echo_strings(&["en", "ru"]);
        let ctx = RenderContext::new(&config, &strings, "ru");
        let meta = PageMeta::new("T", "/authors/", Section::Authors);
        let html = render(base_document(&ctx, &meta, html! { p { "body" } }));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="ru">"#));
        assert!(html.contains(r#"<link rel="canonical" href="https://screenshot.report/ru/authors/">"#));
        assert!(html.contains(r#"hreflang="en" href="https://screenshot.report/en/authors/""#));
        assert!(html.contains(r#"hreflang="ru" href="https://screenshot.report/ru/authors/""#));
        assert!(html.contains(r#"href="/favicon.ico?v=16""#));
        assert!(html.contains(r#"href="/assets/my.css""#));
        assert!(html.contains(r#"<div id="abc"><p>body</p></div>"#));
    }

    #[test]
    fn header_highlights_locale_and_section() {
        let config = config();
        let strings = echo_strings(&["en", "ru"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let meta = PageMeta::new("T", "/authors/", Section::Authors);
        let html = render(base_document(&ctx, &meta, html! {}));

        assert!(html.contains(r#"<a class="bold" href="/en/authors/">en</a>"#));
        assert!(html.contains(r#"<a href="/ru/authors/">ru</a>"#));
        assert!(html.contains(r#"<a class="badge sec p" href="/en/authors/">authors:en</a>"#));
        assert!(html.contains(r#"<a class="badge sec w" href="/en/">rating:en</a>"#));
        assert!(html.contains("ppm:en"));
    }

    #[test]
    fn to_top_link_skips_home_and_about() {
        let config = config();
        let strings = echo_strings(&["en", "ru"]);
        let ctx = RenderContext::new(&config, &strings, "en");

        for (route, expected) in [("/", false), ("/about/", false), ("/new/", true)] {
            let meta = PageMeta::new("T", route, Section::None);
            let html = render(base_document(&ctx, &meta, html! {}));
            assert_eq!(html.contains("to-top"), expected, "{route}");
        }
    }

    #[test]
    fn repository_link_is_optional() {
        let mut config = config();
        let strings = echo_strings(&["en", "ru"]);
        let meta = PageMeta::new("T", "/", Section::Ranking);

        let html = render(base_document(&RenderContext::new(&config, &strings, "en"), &meta, html! {}));
        assert!(!html.contains("class=\"gh\""));

        config.repository_url = Some("https://github.com/example/ledger".into());
        let html = render(base_document(&RenderContext::new(&config, &strings, "en"), &meta, html! {}));
        assert!(html.contains(r#"href="https://github.com/example/ledger""#));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn stat_block_mutes_low_volume_rating() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");

        let posts: Vec<Post> = (0..3).map(|i| scored(&i.to_string(), Status::Completely)).collect();
        let stat = calc_stat(&posts);
        let html = render(render_stat(&ctx, &stat, &AUTHOR_STAT_FIELDS));
        assert!(html.contains(r#"<span class="g2">"#));
        assert!(html.contains("stat.rating:en"));
        assert!(html.contains(">100%<"));

        let posts: Vec<Post> = (0..10).map(|i| scored(&i.to_string(), Status::Completely)).collect();
        let stat = calc_stat(&posts);
        let html = render(render_stat(&ctx, &stat, &AUTHOR_STAT_FIELDS));
        assert!(!html.contains("g2"));
        assert!(html.contains(">7.75<"));
    }

    #[test]
    fn heatmap_is_chronological_and_coloured() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts(
            "7",
            vec![
                dated(scored("2", Status::DidNot), Some("2024-05-01"), None, None),
                dated(scored("1", Status::Almost), Some("2023-01-01"), None, None),
                scored("3", Status::Awaiting),
            ],
        );
        let html = render(render_heatmap(&ctx, &author));
        let first = html.find(r#"<a class="hmc p" href="/en/7/1/">"#).unwrap();
        let second = html.find(r#"<a class="hmc rh" href="/en/7/2/">"#).unwrap();
        let third = html.find(r#"<a class="hmc g" href="/en/7/3/">"#).unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn ranking_badge_colour_follows_prior_mean() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");

        let mut good = author_with_posts("good", vec![]);
        good.stat.rating = Some(5.5);
        let mut poor = author_with_posts("poor", vec![]);
        poor.stat.rating = Some(5.49);
        let html = render(render_ranking(&ctx, &[&good, &poor]));

        assert!(html.contains(r#"<span class="badge rtg p"><small><b>5.50</b></small></span>"#));
        assert!(html.contains(r#"<span class="badge rtg r"><small><b>5.49</b></small></span>"#));
        assert!(html.contains("<b>1.</b>"));
        assert!(html.contains("<b>2.</b>"));
        assert!(html.contains(r#"href="/en/good/""#));
    }

    #[test]
    fn ranking_badge_colour_uses_rounded_rating() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");

        let mut borderline = author_with_posts("b", vec![]);
        borderline.stat.rating = Some(555.0 / 101.0);
        let html = render(render_ranking(&ctx, &[&borderline]));

        assert!(html.contains(r#"<span class="badge rtg p"><small><b>5.50</b></small></span>"#));
    }

    #[test]
    fn authors_table_shows_counts() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let mut author = author_with_posts("7", vec![]);
        author.stat.total_posts = 12;
        author.stat.total_verified = 4;
        let html = render(render_authors(&ctx, &[&author]));
        assert!(html.contains("<b>Author 7</b> (12/4)"));
        assert!(html.contains("<small>About 7</small>"));
    }

    // =========================================================================
    // post tests
    // =========================================================================

    fn sample_post() -> Post {
        let mut p = dated(
            scored("42", Status::Completely),
            Some("2024-03-01"),
            Some("2024-03-02"),
            Some("2024-06-30"),
        );
        p.statement.insert("en", "Prices double.\nSoon.");
        p.context.insert("en", "Radio interview.");
        p.notes.insert("en", "Source: https://example.org/a\nSecond line");
        p.original_language = "ru".into();
        p
    }

    #[test]
    fn post_item_layout() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);
        let html = render(render_post_item(&ctx, &sample_post(), &author, ViewFilter::New));

        assert!(html.contains(r#"<h4><a href="/en/7/">Author 7</a></h4>"#));
        assert!(html.contains(r#"<time datetime="2024-03-01">March 1, 2024</time>"#));
        assert!(html.contains("<sup>ru → en</sup>"));
        assert!(html.contains("Prices double.<br>Soon"));
        assert!(html.contains(r#"<span class="g2">(Radio interview)</span>"#));
        assert!(html.contains(r#"<small class="badge p">completely:en</small>"#));
        assert!(html.contains(r#"<a class="linka" href="/en/7/42/"></a>"#));
        // No stage badge in the "new" view
        assert!(!html.contains("June 30, 2024"));
    }

    #[test]
    fn post_item_stage_badge_matches_view() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);

        let verified = sample_post();
        let html = render(render_post_item(&ctx, &verified, &author, ViewFilter::Verified));
        assert!(html.contains(r#"<small class="badge p">June 30, 2024</small>"#));

        let mut waiting = sample_post();
        waiting.status = Status::Awaiting;
        let html = render(render_post_item(&ctx, &waiting, &author, ViewFilter::Awaiting));
        assert!(html.contains(r#"<small class="badge g">March 2, 2024</small>"#));
        let html = render(render_post_item(&ctx, &waiting, &author, ViewFilter::Verified));
        assert!(!html.contains("March 2, 2024"));
    }

    #[test]
    fn same_language_post_has_no_marker() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);
        let html = render(render_post_item(&ctx, &scored("1", Status::Awaiting), &author, ViewFilter::New));
        assert!(!html.contains("<sup>"));
        assert!(!html.contains("g2"));
    }

    #[test]
    fn post_detail_shows_notes_and_params() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);
        let html = render(render_post(&ctx, &sample_post(), &author));

        assert!(html.contains(r#"<small class="badge p">June 30, 2024</small>"#));
        assert!(html.contains("<b>notes_refs:en</b>"));
        assert!(html.contains(r#"<a class="o" href="https://example.org/a" target="_blank" rel="noopener">"#));
        assert!(html.contains("</a><br>Second line"));
        assert!(html.contains("params:en: completely:en (+7), complex:en (+2), confident:en (+1)"));
        assert!(html.contains("<br>post_total:en 10"));
    }

    #[test]
    fn unscored_post_detail_has_no_points() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);
        let p = dated(scored("1", Status::Awaiting), None, Some("2024-01-05"), None);
        let html = render(render_post(&ctx, &p, &author));

        assert!(html.contains("params:en: awaiting:en, complex:en, confident:en"));
        assert!(!html.contains("post_total"));
        assert!(html.contains(r#"<small class="badge g">January 5, 2024</small>"#));
    }

    #[test]
    fn russian_post_dates() {
        let config = config();
        let strings = echo_strings(&["ru"]);
        let ctx = RenderContext::new(&config, &strings, "ru");
        let author = author_with_posts("7", vec![]);
        let html = render(render_post(&ctx, &sample_post(), &author));
        assert!(html.contains(r#"<time datetime="2024-03-01">1 марта 2024</time>"#));
        assert!(html.contains("30 июня 2024"));
        // Original language matches: no marker
        assert!(!html.contains("<sup>"));
    }

    // =========================================================================
    // page tests
    // =========================================================================

    #[test]
    fn author_page_canonical_is_default_view() {
        let config = config();
        let strings = echo_strings(&["en", "ru"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let mut author = author_with_posts("7", vec![sample_post()]);
        author.stat = calc_stat(&author.posts);
        let posts: Vec<&Post> = author.posts.iter().collect();
        let html = render(render_author_page(&ctx, &author, ViewFilter::Verified, &posts));

        assert!(html.contains("<title>Author 7 | titles.verified:en</title>"));
        assert!(html.contains(r#"<link rel="canonical" href="https://screenshot.report/en/7/">"#));
        assert!(html.contains(r#"hreflang="ru" href="https://screenshot.report/ru/7/verified/""#));
        assert!(html.contains(r#"<a class="badge sec p" href="/en/7/verified/">sf.verified:en</a>"#));
        assert!(html.contains(r#"<a class="badge sec w" href="/en/7/">sf.new:en</a>"#));
        assert!(html.contains(r#"class="heatmap""#));
    }

    #[test]
    fn author_default_view_title() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);
        let html = render(render_author_page(&ctx, &author, ViewFilter::New, &[]));
        assert!(html.contains("<title>Author 7 | titles.prpr:en</title>"));
    }

    #[test]
    fn feed_page_embeds_script_and_first_page() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);
        let p = sample_post();
        let stat = calc_stat([&p]);
        let html = render(render_feed_page(&ctx, ViewFilter::New, &stat, &[(&p, &author)], 3));

        assert!(html.contains(r#"<script data-pages="3">"#));
        assert!(html.contains("insertAdjacentHTML"));
        assert!(html.contains("<title>titles.new:en</title>"));
        assert!(html.contains(r#"<a class="badge sec p" href="/en/new/">predictions:en</a>"#));
        assert!(html.contains(r#"href="/en/7/42/""#));
    }

    #[test]
    fn feed_fragment_is_bare_markup() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let author = author_with_posts("7", vec![]);
        let p = sample_post();
        let html = render(render_feed_fragment(&ctx, ViewFilter::Verified, &[(&p, &author)]));
        assert!(html.starts_with("<article>"));
        assert!(!html.contains("DOCTYPE"));
        assert!(html.contains("June 30, 2024"));
    }

    #[test]
    fn ranking_page_links_about() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let html = render(render_ranking_page(&ctx, &Stat::default(), &[]));
        assert!(html.contains(r#"<a class="u" href="/en/about/">about_notes.how_rating:en</a>"#));
        assert!(html.contains("<p>about_notes.rtg_note:en</p>"));
        assert!(!html.contains("to-top"));
    }

    #[test]
    fn about_page_inserts_body() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let html = render(render_about_page(&ctx, "<h2>How</h2>"));
        assert!(html.contains("<article><h2>How</h2></article>"));
        assert!(html.contains("<title>titles.about:en</title>"));
    }

    #[test]
    fn escaped_record_text_is_not_escaped_twice() {
        let config = config();
        let strings = echo_strings(&["en"]);
        let ctx = RenderContext::new(&config, &strings, "en");
        let mut author = author_with_posts("7", vec![]);
        author.name.insert("en", escape_html("Smith & <Sons>"));
        let html = render(render_authors(&ctx, &[&author]));
        assert!(html.contains("<b>Smith &amp; &lt;Sons&gt;</b>"));
    }
}
