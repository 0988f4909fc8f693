use std::borrow::Borrow;
use std::collections::HashMap;

use serde::Serialize;

use super::stats::{mean, ratio};
use crate::parser::types::{Review, Sentiment};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRow {
    pub city: String,
    pub total: usize,
    /// Negative reviews / total, in [0, 1].
    pub neg_pct: f64,
    /// Mean over rated reviews only; 0 when none are rated.
    pub avg_rating: f64,
}

#[derive(Default)]
struct CityAcc {
    total: usize,
    negative: usize,
    ratings: Vec<f64>,
}

/// Per-city volume, negativity and rating, busiest first, truncated to `top_n`.
///
/// Cities are keyed by their trimmed location; reviews without one are skipped.
pub fn city_table<R: Borrow<Review>>(reviews: &[R], top_n: usize) -> Vec<CityRow> {
    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, CityAcc> = HashMap::new();

    for r in reviews {
        let review: &Review = r.borrow();
        let city = review.location.trim();
        if city.is_empty() {
            continue;
        }
        let entry = acc.entry(city.to_string()).or_insert_with(|| {
            order.push(city.to_string());
            CityAcc::default()
        });
        entry.total += 1;
        if review.sentiment == Sentiment::Negative {
            entry.negative += 1;
        }
        if let Some(rating) = review.rating.filter(|r| *r > 0.0) {
            entry.ratings.push(rating);
        }
    }

    let mut rows: Vec<CityRow> = order
        .into_iter()
        .filter_map(|city| {
            let a = acc.remove(&city)?;
            Some(CityRow {
                neg_pct: ratio(a.negative, a.total),
                avg_rating: mean(&a.ratings),
                total: a.total,
                city,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows.truncate(top_n);
    rows
}
