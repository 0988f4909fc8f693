use std::borrow::Borrow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzer::stats::{mean, round2, std_dev};
use crate::parser::types::{Review, Sentiment};

/// Default σ multiplier for the spike threshold.
pub const DEFAULT_SIGMA: f64 = 2.0;

/// Day whose negative-review count exceeds the baseline threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRow {
    pub date: NaiveDate,
    pub count: usize,
    /// Rounded to 2 decimals.
    pub threshold: f64,
}

/// Statistics of the per-day negative counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativityBaseline {
    pub days: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
}

/// Negative reviews per calendar day. Days without negatives are absent.
pub fn daily_negative_counts<R: Borrow<Review>>(reviews: &[R]) -> BTreeMap<NaiveDate, usize> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for r in reviews {
        let review: &Review = r.borrow();
        if review.sentiment != Sentiment::Negative {
            continue;
        }
        if let Some(day) = review.date {
            *by_day.entry(day).or_insert(0) += 1;
        }
    }
    by_day
}

/// Mean and population σ over the days that had at least one negative review.
///
/// Zero-negative days are not part of the baseline.
// TODO: optionally count zero-negative days inside the observed range, which
// would lower the mean on sparse datasets.
pub fn negativity_baseline(by_day: &BTreeMap<NaiveDate, usize>, sigma: f64) -> Option<NegativityBaseline> {
    if by_day.is_empty() {
        return None;
    }
    let counts: Vec<f64> = by_day.values().map(|&c| c as f64).collect();
    let m = mean(&counts);
    let sd = std_dev(&counts);
    Some(NegativityBaseline {
        days: counts.len(),
        mean: m,
        std_dev: sd,
        threshold: m + sigma * sd,
    })
}

/// Days whose negative count strictly exceeds `mean + sigma·σ`, largest first.
///
/// # Algorithm
/// 1. Count negative reviews per day (undated reviews skipped)
/// 2. Mean and population σ over the non-zero days
/// 3. Round the threshold to 2 decimals, flag days with `count > threshold`
/// 4. Sort by count descending; ties keep chronological order
///
/// The comparison uses the reported (rounded) threshold, so a row never
/// carries a threshold equal to its count.
pub fn detect_anomalies<R: Borrow<Review>>(reviews: &[R], sigma: f64) -> Vec<AnomalyRow> {
    let by_day = daily_negative_counts(reviews);
    let Some(baseline) = negativity_baseline(&by_day, sigma) else {
        return vec![];
    };

    let threshold = round2(baseline.threshold);

    let mut rows: Vec<AnomalyRow> = by_day
        .into_iter()
        .filter(|&(_, count)| count as f64 > threshold)
        .map(|(date, count)| AnomalyRow { date, count, threshold })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}
