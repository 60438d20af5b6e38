//! Author rankings, feed ordering and pagination.
//!
//! ## Rankings
//!
//! - **By rating**: authors with at least [`crate::stats::MIN_VERIFIED`] verified posts,
//!   best rating first; more verified posts wins a tie.
//! - **By volume**: every author, most posts first.
//!
//! Both sorts are stable, so remaining ties keep the input order.
//!
//! ## Feeds
//!
//! Posts are listed through one of three [`ViewFilter`]s. A missing date sorts
//! as if it were the latest possible date: undated posts open the descending
//! `new` and `verified` views and close the ascending `awaiting` view.
//!
//! ## Pagination
//!
//! Long feeds are cut into pages of [`PAGE_SIZE`]. Page 1 is embedded in the
//! listing page; later pages become fragments fetched on scroll.

use crate::types::{Author, Post, Status};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Posts per feed page.
pub const PAGE_SIZE: usize = 100;

/// Which subset and ordering of posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewFilter {
    New,
    Awaiting,
    Verified,
}

impl ViewFilter {
    pub const ALL: [ViewFilter; 3] = [ViewFilter::New, ViewFilter::Awaiting, ViewFilter::Verified];

    pub fn slug(self) -> &'static str {
        match self {
            ViewFilter::New => "new",
            ViewFilter::Awaiting => "awaiting",
            ViewFilter::Verified => "verified",
        }
    }

    pub fn includes(self, post: &Post) -> bool {
        match self {
            ViewFilter::New => true,
            ViewFilter::Awaiting => post.status == Status::Awaiting,
            ViewFilter::Verified => post.status != Status::Awaiting,
        }
    }

    /// Filter and order posts for this view.
    pub fn apply<'a, I>(self, posts: I) -> Vec<&'a Post>
    where
        I: IntoIterator<Item = &'a Post>,
    {
        let mut selected: Vec<&Post> = posts.into_iter().filter(|p| self.includes(p)).collect();
        match self {
            ViewFilter::New => selected.sort_by(|a, b| by_date(b, a, |p| p.time_statement)),
            ViewFilter::Awaiting => selected.sort_by(|a, b| by_date(a, b, |p| p.time_awaiting)),
            ViewFilter::Verified => selected.sort_by(|a, b| by_date(b, a, |p| p.time_verified)),
        }
        selected
    }
}

/// Compare by (date, id), treating a missing date as the latest date.
fn by_date(a: &Post, b: &Post, date: impl Fn(&Post) -> Option<NaiveDate>) -> Ordering {
    let key = |p: &Post| date(p).unwrap_or(NaiveDate::MAX);
    key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
}

/// Chronological order used by the author heatmap (undated last).
pub fn chronological<'a, I>(posts: I) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut sorted: Vec<&Post> = posts.into_iter().collect();
    sorted.sort_by(|a, b| by_date(a, b, |p| p.time_statement));
    sorted
}

/// Authors eligible for the rating table, best first.
pub fn rank_by_rating<'a, I>(authors: I) -> Vec<&'a Author>
where
    I: IntoIterator<Item = &'a Author>,
{
    let mut ranked: Vec<&Author> = authors
        .into_iter()
        .filter(|a| a.stat.is_rankable())
        .collect();
    ranked.sort_by(|a, b| {
        b.stat
            .rating_key()
            .total_cmp(&a.stat.rating_key())
            .then_with(|| b.stat.total_verified.cmp(&a.stat.total_verified))
    });
    ranked
}

/// Every author, most posts first.
pub fn rank_by_volume<'a, I>(authors: I) -> Vec<&'a Author>
where
    I: IntoIterator<Item = &'a Author>,
{
    let mut ranked: Vec<&Author> = authors.into_iter().collect();
    ranked.sort_by(|a, b| b.stat.total_posts.cmp(&a.stat.total_posts));
    ranked
}

/// Split a feed into pages of `size`. An empty feed has no pages.
pub fn paginate<T>(items: &[T], size: usize) -> Vec<&[T]> {
    items.chunks(size.max(1)).collect()
}
