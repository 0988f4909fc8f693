use std::borrow::Borrow;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::parser::types::{Review, Source};

/// Conjunctive review filter. Unset fields and an empty category set pass everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub categories: BTreeSet<String>,
    pub text: Option<String>,
    pub city: Option<String>,
}

impl FilterConfig {
    pub fn matches(&self, review: &Review) -> bool {
        self.matches_date(review)
            && self.matches_category(review)
            && self.matches_text(review)
            && self.matches_city(review)
    }

    /// Inclusive range. An undated review fails any configured bound.
    fn matches_date(&self, review: &Review) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(date) = review.date else {
            return false;
        };
        self.date_from.map_or(true, |from| from <= date) && self.date_to.map_or(true, |to| date <= to)
    }

    fn matches_category(&self, review: &Review) -> bool {
        self.categories.is_empty() || review.categories.iter().any(|c| self.categories.contains(c))
    }

    fn matches_text(&self, review: &Review) -> bool {
        match normalized_query(self.text.as_deref()) {
            None => true,
            Some(q) => review.text.to_lowercase().contains(&q) || review.title.to_lowercase().contains(&q),
        }
    }

    fn matches_city(&self, review: &Review) -> bool {
        match normalized_query(self.city.as_deref()) {
            None => true,
            Some(q) => review.location.to_lowercase().contains(&q),
        }
    }
}

fn normalized_query(q: Option<&str>) -> Option<String> {
    q.map(str::trim).filter(|q| !q.is_empty()).map(str::to_lowercase)
}

/// Working subset for all analytics, in input order.
pub fn filter_reviews<'a>(reviews: &'a [Review], config: &FilterConfig) -> Vec<&'a Review> {
    reviews.iter().filter(|r| config.matches(r)).collect()
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceColumns<T> {
    pub sravni: Vec<T>,
    pub bankiru: Vec<T>,
    pub other: Vec<T>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCounts {
    pub sravni: usize,
    pub bankiru: usize,
    pub other: usize,
}

/// Split reviews into one column per originating site, keeping order.
pub fn reviews_by_source<R: Borrow<Review> + Clone>(reviews: &[R]) -> SourceColumns<R> {
    let mut columns = SourceColumns {
        sravni: Vec::new(),
        bankiru: Vec::new(),
        other: Vec::new(),
    };
    for r in reviews {
        let review: &Review = r.borrow();
        match review.source {
            Source::Sravni => columns.sravni.push(r.clone()),
            Source::Bankiru => columns.bankiru.push(r.clone()),
            Source::Other => columns.other.push(r.clone()),
        }
    }
    columns
}

pub fn source_counts<R: Borrow<Review>>(reviews: &[R]) -> SourceCounts {
    let mut counts = SourceCounts::default();
    for r in reviews {
        let review: &Review = r.borrow();
        match review.source {
            Source::Sravni => counts.sravni += 1,
            Source::Bankiru => counts.bankiru += 1,
            Source::Other => counts.other += 1,
        }
    }
    counts
}
