//! Scoring table and aggregate statistics.
//!
//! Every resolved post earns points on three independent axes: the outcome
//! itself, how hard the claim was, and how hedged it was. The per-post total
//! feeds a Bayesian-smoothed author rating:
//!
//! ```text
//! rating = (C·m + Σ totals) / (C + n)        m = 5.5, C = 10
//! ```
//!
//! The prior pulls authors with few resolved posts towards the middle of the
//! scale, so a single lucky call cannot top the ranking.
//!
//! "No data" (zero denominators, nothing scored yet) is carried as `None` and
//! only turns into the `*` placeholder when rendered.

use crate::types::{Complexity, Confidence, Post, Status};
use std::collections::BTreeSet;

/// Prior mean of the smoothed rating.
pub const PRIOR_MEAN: f64 = 5.5;
/// Weight of the prior, in posts.
pub const PRIOR_WEIGHT: f64 = 10.0;
/// Verified posts an author needs before the rating is shown at full
/// strength and before they enter the ranking.
pub const MIN_VERIFIED: usize = 10;
/// Placeholder shown for undefined values.
pub const SENTINEL: &str = "*";

/// Points awarded to one resolved post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub status: i32,
    pub complexity: i32,
    pub confidence: i32,
}

impl Score {
    pub fn total(self) -> i32 {
        self.status + self.complexity + self.confidence
    }

    /// Arithmetic form of the total, e.g. `7+2+1` or `2+0-1`.
    pub fn breakdown(self) -> String {
        format!(
            "{}{:+}{:+}",
            self.status, self.complexity, self.confidence
        )
    }
}

/// Format points with an explicit sign: `+7`, `+0`, `-1`.
pub fn signed(points: i32) -> String {
    format!("{points:+}")
}

/// Look up the scoring table.
///
/// `awaiting` and `unverifiable` have no entry; they are answered before the
/// table is consulted.
pub fn score(status: Status, complexity: Complexity, confidence: Confidence) -> Option<Score> {
    use Complexity::{Complex, Regular};
    use Confidence::{Careful, Confident};

    let (status_pts, complexity_pts, confidence_pts) = match (status, complexity, confidence) {
        (Status::Awaiting | Status::Unverifiable, _, _) => return None,
        (Status::Completely, Complex, Confident) => (7, 2, 1),
        (Status::Completely, Complex, Careful) => (7, 2, 0),
        (Status::Completely, Regular, Confident) => (7, 0, 1),
        (Status::Completely, Regular, Careful) => (7, 0, 0),
        (Status::Almost, Complex, _) => (5, 2, 0),
        (Status::Almost, Regular, _) => (5, 0, 0),
        (Status::DidNot, _, Confident) => (2, 0, -1),
        (Status::DidNot, _, Careful) => (2, 0, 0),
    };

    Some(Score {
        status: status_pts,
        complexity: complexity_pts,
        confidence: confidence_pts,
    })
}

/// Aggregate statistics over a set of posts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stat {
    pub total_authors: usize,
    pub total_posts: usize,
    pub total_verified: usize,
    pub success: usize,
    pub success_pct: Option<u32>,
    pub complex_pct: Option<u32>,
    pub confident_pct: Option<u32>,
    /// Unrounded smoothed rating. Rounded only for display.
    pub rating: Option<f64>,
}

impl Stat {
    /// The rating as displayed: rounded to two decimals.
    pub fn displayed_rating(&self) -> Option<f64> {
        self.rating.map(|r| (r * 100.0).round() / 100.0)
    }

    pub fn rating_label(&self) -> String {
        self.displayed_rating()
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    /// At or above the prior mean, judged on the displayed value.
    pub fn is_rating_positive(&self) -> bool {
        self.displayed_rating().is_some_and(|r| r >= PRIOR_MEAN)
    }

    /// Too few verified posts for the rating to mean much.
    pub fn is_rating_muted(&self) -> bool {
        self.total_verified < MIN_VERIFIED
    }

    pub fn is_rankable(&self) -> bool {
        self.total_verified >= MIN_VERIFIED
    }

    /// Sort key: unrated sorts below every real rating.
    pub fn rating_key(&self) -> f64 {
        self.rating.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn field(&self, field: StatField) -> String {
        match field {
            StatField::TotalAuthors => self.total_authors.to_string(),
            StatField::TotalPosts => self.total_posts.to_string(),
            StatField::TotalVerified => self.total_verified.to_string(),
            StatField::SuccessPct => percent_label(self.success_pct),
            StatField::ComplexPct => percent_label(self.complex_pct),
            StatField::ConfidentPct => percent_label(self.confident_pct),
            StatField::Rating => self.rating_label(),
        }
    }
}

/// A displayable cell of a [`Stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    TotalAuthors,
    TotalPosts,
    TotalVerified,
    SuccessPct,
    ComplexPct,
    ConfidentPct,
    Rating,
}

impl StatField {
    /// Locale-string key of the field's label.
    pub fn label_key(self) -> &'static str {
        match self {
            StatField::TotalAuthors => "stat.total_authors",
            StatField::TotalPosts => "stat.total_posts",
            StatField::TotalVerified => "stat.total_verified",
            StatField::SuccessPct => "stat.success_pct",
            StatField::ComplexPct => "stat.complex_pct",
            StatField::ConfidentPct => "stat.confident_pct",
            StatField::Rating => "stat.rating",
        }
    }
}

/// `round(count * 100 / denominator)`, or `None` for an empty denominator.
///
/// Halves round to even.
pub fn percent(count: usize, denominator: usize) -> Option<u32> {
    if denominator == 0 {
        return None;
    }
    Some((count as f64 * 100.0 / denominator as f64).round_ties_even() as u32)
}

pub fn percent_label(pct: Option<u32>) -> String {
    pct.map(|p| format!("{p}%"))
        .unwrap_or_else(|| SENTINEL.to_string())
}

/// Smoothed mean of the given post totals; `None` when there are none.
pub fn bayesian_average(totals: &[i32]) -> Option<f64> {
    if totals.is_empty() {
        return None;
    }
    let sum: i32 = totals.iter().sum();
    Some((PRIOR_WEIGHT * PRIOR_MEAN + sum as f64) / (PRIOR_WEIGHT + totals.len() as f64))
}

/// Compute the statistics of a post collection.
pub fn calc_stat<'a, I>(posts: I) -> Stat
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut authors = BTreeSet::new();
    let mut total_posts = 0;
    let mut total_verified = 0;
    let mut success = 0;
    let mut complex = 0;
    let mut confident = 0;
    let mut totals = Vec::new();

    for post in posts {
        authors.insert(post.author_id.as_str());
        total_posts += 1;
        if post.status.is_verified() {
            total_verified += 1;
        }
        if post.status.is_success() {
            success += 1;
        }
        if post.complexity == Complexity::Complex {
            complex += 1;
        }
        if post.confidence == Confidence::Confident {
            confident += 1;
        }
        if let Some(score) = post.score() {
            totals.push(score.total());
        }
    }

    Stat {
        total_authors: authors.len(),
        total_posts,
        total_verified,
        success,
        success_pct: percent(success, total_verified),
        complex_pct: percent(complex, total_posts),
        confident_pct: percent(confident, total_posts),
        rating: bayesian_average(&totals),
    }
}
