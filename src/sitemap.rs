//! XML sitemap with `hreflang` alternates.
//!
//! Every route is listed once per locale. Each `<url>` carries an
//! `xhtml:link` alternate for every locale plus an `x-default` pointing at
//! the default locale, so search engines can pair translations.
//!
//! Route order: ranking home, the fixed site pages, then for each author the
//! three author views followed by that author's posts.

use crate::config::SiteConfig;
use crate::ranking::ViewFilter;
use crate::render::{ABOUT_ROUTE, AUTHORS_ROUTE, HOME_ROUTE, author_route, feed_route, post_route};
use crate::types::Author;
use std::fmt::Write as _;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Every locale-relative route the site publishes, in sitemap order.
pub fn site_routes<'a, I>(authors: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Author>,
{
    let mut routes = vec![
        HOME_ROUTE.to_string(),
        ABOUT_ROUTE.to_string(),
        AUTHORS_ROUTE.to_string(),
    ];
    routes.extend(ViewFilter::ALL.into_iter().map(feed_route));

    for author in authors {
        routes.extend(ViewFilter::ALL.into_iter().map(|v| author_route(&author.id, v)));
        routes.extend(author.posts.iter().map(|p| post_route(&author.id, &p.id)));
    }
    routes
}

/// Render `sitemap.xml` for the given authors (with posts attached).
pub fn generate_sitemap<'a, I>(config: &SiteConfig, authors: I) -> String
where
    I: IntoIterator<Item = &'a Author>,
{
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    // Writing into a String cannot fail.
    let _ = writeln!(xml, r#"<urlset xmlns="{SITEMAP_NS}" xmlns:xhtml="{XHTML_NS}">"#);

    for route in site_routes(authors) {
        let alternates = alternates(config, &route);
        for locale in &config.locales {
            let _ = writeln!(xml, "  <url>");
            let _ = writeln!(xml, "    <loc>{}</loc>", locale_url(config, locale, &route));
            xml.push_str(&alternates);
            let _ = writeln!(xml, "  </url>");
        }
    }

    xml.push_str("</urlset>\n");
    xml
}

fn locale_url(config: &SiteConfig, locale: &str, route: &str) -> String {
    config.absolute_url(&format!("/{locale}{route}"))
}

fn alternates(config: &SiteConfig, route: &str) -> String {
    let mut out = String::new();
    let link = |out: &mut String, hreflang: &str, locale: &str| {
        let _ = writeln!(
            out,
            r#"    <xhtml:link rel="alternate" hreflang="{hreflang}" href="{}" />"#,
            locale_url(config, locale, route)
        );
    };
    for locale in &config.locales {
        link(&mut out, locale, locale);
    }
    link(&mut out, "x-default", &config.default_locale);
    out
}
