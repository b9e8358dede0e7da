//! Message-count statistics over a filtered conversation set.
//!
//! Percentiles use the nearest-rank method on the ascending values:
//! `index = ceil(p / 100 * n) - 1`, clamped to `[0, n - 1]`. For counts `1..=10` this
//! gives P25 = 3 and P90 = 9. The median is the usual midpoint average.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::filters::{CatalogFilter, FilterOutcome, TimeReference, apply_filter, sort_most_recent_first};
use crate::models::Conversation;

pub const TOP_CONVERSATIONS: usize = 5;

/// Histogram bucket bounds, inclusive; `None` is open-ended
const BUCKETS: [(&str, usize, Option<usize>); 6] = [
    ("1-5", 1, Some(5)),
    ("6-15", 6, Some(15)),
    ("16-30", 16, Some(30)),
    ("31-50", 31, Some(50)),
    ("51-100", 51, Some(100)),
    ("100+", 101, None),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: &'static str,
    pub min: usize,
    pub max: Option<usize>,
    pub count: usize,
}

impl Bucket {
    fn contains(&self, value: usize) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub total: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation, 0 for fewer than two values
    pub stdev: f64,
    pub min: usize,
    pub max: usize,
    pub p25: usize,
    pub p75: usize,
    pub p90: usize,
    pub distribution: Vec<Bucket>,
    /// Earliest and latest known `created_at` in the set
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl StatsSummary {
    /// Summary of nothing: all zeros, empty buckets
    pub fn empty() -> Self {
        Self {
            count: 0,
            total: 0,
            mean: 0.0,
            median: 0.0,
            stdev: 0.0,
            min: 0,
            max: 0,
            p25: 0,
            p75: 0,
            p90: 0,
            distribution: empty_distribution(),
            start: None,
            end: None,
        }
    }
}

fn empty_distribution() -> Vec<Bucket> {
    BUCKETS.iter().map(|&(label, min, max)| Bucket { label, min, max, count: 0 }).collect()
}

/// Nearest-rank percentile of ascending `sorted`; 0 for an empty slice
pub fn percentile(sorted: &[usize], p: usize) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    let n = sorted.len();
    let rank = (p.min(100) * n).div_ceil(100);
    sorted[rank.saturating_sub(1).min(n - 1)]
}

fn median(sorted: &[usize]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2] as f64,
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0,
    }
}

/// Summarize message counts of `conversations`
pub fn summarize<'a, I>(conversations: I) -> StatsSummary
where
    I: IntoIterator<Item = &'a Conversation>,
{
    let mut values = Vec::new();
    let mut start: Option<DateTime<Utc>> = None;
    let mut end: Option<DateTime<Utc>> = None;

    for conversation in conversations {
        values.push(conversation.message_count);
        if let Some(ts) = conversation.created_at {
            start = Some(start.map_or(ts, |s| s.min(ts)));
            end = Some(end.map_or(ts, |e| e.max(ts)));
        }
    }

    if values.is_empty() {
        return StatsSummary::empty();
    }

    values.sort_unstable();
    let count = values.len();
    let total: usize = values.iter().sum();
    let mean = total as f64 / count as f64;
    let variance = if count > 1 {
        values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / (count - 1) as f64
    } else {
        0.0
    };

    let mut distribution = empty_distribution();
    for &value in &values {
        if let Some(bucket) = distribution.iter_mut().find(|b| b.contains(value)) {
            bucket.count += 1;
        }
    }

    StatsSummary {
        count,
        total,
        mean,
        median: median(&values),
        stdev: variance.sqrt(),
        min: values[0],
        max: values[count - 1],
        p25: percentile(&values, 25),
        p75: percentile(&values, 75),
        p90: percentile(&values, 90),
        distribution,
        start,
        end,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub summary: StatsSummary,
    /// Largest conversations by message count, ties to the most recent
    pub top: Vec<Conversation>,
    pub filter: FilterOutcome,
}

/// Overall statistics for the conversations accepted by `filter`
pub fn compute_stats(conversations: &[Conversation], filter: &CatalogFilter) -> StatsReport {
    let (mut kept, outcome) = apply_filter(conversations, filter);
    let summary = summarize(kept.iter().copied());

    sort_most_recent_first(&mut kept);
    kept.sort_by(|a, b| b.message_count.cmp(&a.message_count));
    let top = kept.into_iter().take(TOP_CONVERSATIONS).cloned().collect();

    StatsReport { summary, top, filter: outcome }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    /// Inclusive
    pub start: DateTime<Utc>,
    /// Exclusive
    pub end: DateTime<Utc>,
    pub summary: StatsSummary,
}

/// Per-week statistics for the last `weeks` weeks ending at `reference.now`, oldest first
///
/// Week `i` covers `[now - (weeks - i) * 7d, now - (weeks - i - 1) * 7d)`. Always returns
/// exactly `weeks` entries; bounds earlier than the representable range clamp to
/// `DateTime::<Utc>::MIN_UTC`. Conversations with unknown timestamps fall in no week.
pub fn weekly_breakdown(
    conversations: &[Conversation],
    filter: &CatalogFilter,
    weeks: usize,
    reference: &TimeReference,
) -> (Vec<WeeklyStats>, FilterOutcome) {
    let (kept, outcome) = apply_filter(conversations, filter);
    let weeks_before_now = |n: usize| {
        i64::try_from(n)
            .ok()
            .and_then(Duration::try_weeks)
            .and_then(|span| reference.now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    };

    let mut breakdown = Vec::with_capacity(weeks);
    for i in 0..weeks {
        let start = weeks_before_now(weeks - i);
        let end = weeks_before_now(weeks - i - 1);

        let in_week = kept.iter().copied().filter(|c| c.created_at.is_some_and(|ts| ts >= start && ts < end));
        breakdown.push(WeeklyStats { start, end, summary: summarize(in_week) });
    }

    (breakdown, outcome)
}
