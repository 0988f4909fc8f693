use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::stats::percent;
use crate::parser::types::{Review, Sentiment};

// ─── Data Structures ─────────────────────────────────────────────────────────

/// Raw sentiment counts for one bucket. `total` also counts excluded reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAggregate {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentShares {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl SentimentAggregate {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Excluded => {}
        }
        self.total += 1;
    }

    pub fn shares(&self) -> SentimentShares {
        SentimentShares {
            positive: percent(self.positive, self.total),
            neutral: percent(self.neutral, self.total),
            negative: percent(self.negative, self.total),
        }
    }

    /// `(positive - negative) / total`, in [-1, 1]; 0 for an empty bucket.
    pub fn score(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.positive as f64 - self.negative as f64) / self.total as f64
    }
}

/// One row of the per-product chart: percentages plus volume and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSentiment {
    pub product: String,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
    pub total: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBucket {
    /// `YYYY-MM`
    pub date: String,
    #[serde(flatten)]
    pub counts: SentimentAggregate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendShare {
    pub date: String,
    #[serde(flatten)]
    pub shares: SentimentShares,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Counts per category label, in first-seen order.
///
/// A label listed twice on one review counts once. When `selected` is not
/// empty, only the selected labels of each review are counted.
pub fn aggregate_by_category<R: Borrow<Review>>(
    reviews: &[R],
    selected: &BTreeSet<String>,
) -> Vec<(String, SentimentAggregate)> {
    let mut rows: Vec<(String, SentimentAggregate)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for r in reviews {
        let review: &Review = r.borrow();
        for (pos, category) in review.categories.iter().enumerate() {
            if review.categories[..pos].contains(category) {
                continue;
            }
            if !selected.is_empty() && !selected.contains(category) {
                continue;
            }
            let slot = *index.entry(category.clone()).or_insert_with(|| {
                rows.push((category.clone(), SentimentAggregate::default()));
                rows.len() - 1
            });
            rows[slot].1.record(review.sentiment);
        }
    }
    rows
}

/// Per-product rows sorted by negative share, highest first (stable).
pub fn product_sentiments<R: Borrow<Review>>(
    reviews: &[R],
    selected: &BTreeSet<String>,
) -> Vec<ProductSentiment> {
    let mut rows: Vec<ProductSentiment> = aggregate_by_category(reviews, selected)
        .into_iter()
        .map(|(product, agg)| {
            let shares = agg.shares();
            ProductSentiment {
                product,
                positive: shares.positive,
                neutral: shares.neutral,
                negative: shares.negative,
                total: agg.total,
                score: agg.score(),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.negative.cmp(&a.negative));
    rows
}

/// Monthly timeline, ascending by `YYYY-MM`. Undated reviews are skipped.
pub fn aggregate_by_month<R: Borrow<Review>>(reviews: &[R]) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<String, SentimentAggregate> = BTreeMap::new();
    for r in reviews {
        let review: &Review = r.borrow();
        if let Some(key) = review.month_key() {
            buckets.entry(key).or_default().record(review.sentiment);
        }
    }
    buckets
        .into_iter()
        .map(|(date, counts)| TimelineBucket { date, counts })
        .collect()
}

/// Timeline re-expressed as rounded percentages per month.
pub fn trend_shares(timeline: &[TimelineBucket]) -> Vec<TrendShare> {
    timeline
        .iter()
        .map(|b| TrendShare {
            date: b.date.clone(),
            shares: b.counts.shares(),
        })
        .collect()
}
