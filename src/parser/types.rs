use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::deserializers::de;

/// One review record as it arrives from the data source.
///
/// Two shapes are accepted: the scraped export (`url`, `review_text`,
/// `categories`, numeric `sentiment`, `DD.MM.YYYY` dates) and the compact
/// dashboard shape (`id`, `text`, `products`, label `sentiment`, ISO dates).
/// Both spellings of a field may appear on the same record; they are merged
/// during normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRaw {
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub id: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub rating: Option<f64>,
    pub review_text: Option<String>,
    pub text: Option<String>,
    pub bank_response: Option<bool>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<String>,
    pub main_category: Option<String>,
    pub sentiment: Option<RawSentiment>,
    pub source: Option<String>,
}

/// Sentiment as encoded by the source: legacy numeric code or a text label.
/// Anything else lands in `Other` and maps to `Sentiment::Excluded`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawSentiment {
    Code(i64),
    Label(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    /// Unlabelled or unmapped code; counted in totals only.
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Sravni,
    Bankiru,
    Other,
}

/// Canonical review, produced once by normalization and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    /// `None` when the source date could not be parsed.
    pub date: Option<NaiveDate>,
    /// Defaults to 00:00 when the source has no time.
    pub time: NaiveTime,
    pub categories: Vec<String>,
    pub location: String,
    pub sentiment: Sentiment,
    /// `None` for unrated reviews (source rating 0 or missing).
    pub rating: Option<f64>,
    pub title: String,
    pub text: String,
    pub source: Source,
    pub author: String,
    pub bank_response: bool,
}

impl Review {
    /// `YYYY-MM` bucket key.
    pub fn month_key(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m").to_string())
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.date.map(|d| d.and_time(self.time))
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseWarning {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total_reviews: usize,
    pub skipped_records: usize,
    pub undated_reviews: usize,
    pub excluded_sentiment: usize,
    pub warnings: Vec<ParseWarning>,
    pub parse_duration_ms: u64,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Minimal canonical review for unit tests; `date` is ISO.
    pub fn review(id: &str, date: &str, sentiment: Sentiment, categories: &[&str], text: &str) -> Review {
        Review {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            time: NaiveTime::MIN,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            location: String::new(),
            sentiment,
            rating: None,
            title: String::new(),
            text: text.to_string(),
            source: Source::Other,
            author: String::new(),
            bank_response: false,
        }
    }

    pub fn at(mut review: Review, time: &str) -> Review {
        review.time = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
        review
    }

    pub fn located(mut review: Review, location: &str, rating: Option<f64>) -> Review {
        review.location = location.to_string();
        review.rating = rating;
        review
    }
}
