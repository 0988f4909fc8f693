use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveTime;

use crate::error::AppError;
use crate::parser::deserializers::{
    classify_source, map_sentiment, parse_clock_time, parse_review_date, parse_source_label,
};
use crate::parser::types::{ImportResult, ParseWarning, Review, ReviewRaw, Sentiment, Source};

/// Output of `parse_reviews_*` — normalized reviews plus load diagnostics.
#[derive(Debug)]
pub struct ParseOutput {
    pub reviews: Vec<Review>,
    pub warnings: Vec<ParseWarning>,
    pub total_records: usize,
    pub skipped_records: usize,
    pub parse_duration_ms: u64,
}

impl ParseOutput {
    pub fn import_result(&self) -> ImportResult {
        ImportResult {
            total_reviews: self.reviews.len(),
            skipped_records: self.skipped_records,
            undated_reviews: self.reviews.iter().filter(|r| r.date.is_none()).count(),
            excluded_sentiment: self
                .reviews
                .iter()
                .filter(|r| r.sentiment == Sentiment::Excluded)
                .count(),
            warnings: self.warnings.clone(),
            parse_duration_ms: self.parse_duration_ms,
        }
    }
}

/// Load a JSON array of review records from `path`.
pub fn parse_reviews_file(path: impl AsRef<Path>) -> Result<ParseOutput, AppError> {
    let file = std::fs::File::open(path)?;
    parse_reviews_reader(std::io::BufReader::new(file))
}

pub fn parse_reviews_reader<R: Read>(reader: R) -> Result<ParseOutput, AppError> {
    let records: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    parse_records(records)
}

pub fn parse_reviews_json(raw: &str) -> Result<ParseOutput, AppError> {
    let records: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    parse_records(records)
}

/// Records that fail to deserialize are skipped with a warning; records that
/// deserialize but carry bad fields are kept with sentinel values.
fn parse_records(records: Vec<serde_json::Value>) -> Result<ParseOutput, AppError> {
    let start = Instant::now();
    if records.is_empty() {
        return Err(AppError::EmptyDataset);
    }

    let total_records = records.len();
    let mut reviews: Vec<Review> = Vec::with_capacity(total_records);
    let mut warnings: Vec<ParseWarning> = Vec::new();
    let mut skipped = 0usize;
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, value) in records.into_iter().enumerate() {
        match serde_json::from_value::<ReviewRaw>(value) {
            Ok(raw) => {
                let (review, messages) = normalize_review(&raw, index);
                if !seen_ids.insert(review.id.clone()) {
                    warnings.push(ParseWarning {
                        index,
                        message: format!("duplicate id '{}'", review.id),
                    });
                }
                warnings.extend(
                    messages
                        .into_iter()
                        .map(|message| ParseWarning { index, message }),
                );
                reviews.push(review);
            }
            Err(err) => {
                warnings.push(ParseWarning {
                    index,
                    message: err.to_string(),
                });
                skipped += 1;
            }
        }
    }

    for w in &warnings {
        log::warn!("review #{}: {}", w.index, w.message);
    }

    let output = ParseOutput {
        reviews,
        warnings,
        total_records,
        skipped_records: skipped,
        parse_duration_ms: start.elapsed().as_millis() as u64,
    };
    log::info!(
        "Loaded {} reviews ({} skipped, {} warnings) in {} ms",
        output.reviews.len(),
        output.skipped_records,
        output.warnings.len(),
        output.parse_duration_ms
    );
    Ok(output)
}

/// Lift a raw record to its canonical form.
///
/// Never fails: problems are reported as messages and the affected field gets
/// its sentinel (`date: None`, `Sentiment::Excluded`, time 00:00).
pub fn normalize_review(raw: &ReviewRaw, index: usize) -> (Review, Vec<String>) {
    let mut messages = Vec::new();

    let url = raw.url.as_deref().map(str::trim).unwrap_or("");
    let id = match (raw.id.as_deref(), url) {
        (Some(id), _) => id.to_string(),
        (None, url) if !url.is_empty() => url.to_string(),
        _ => {
            messages.push("missing id and url".to_string());
            format!("review-{index}")
        }
    };

    let date_raw = raw.date.as_deref().unwrap_or("");
    let date = parse_review_date(date_raw);
    if date.is_none() {
        messages.push(format!("unparseable date '{date_raw}'"));
    }

    let time = match raw.time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => parse_clock_time(t).unwrap_or_else(|| {
            messages.push(format!("unparseable time '{t}', using 00:00"));
            NaiveTime::MIN
        }),
        None => NaiveTime::MIN,
    };

    let mut categories: Vec<String> = Vec::with_capacity(raw.categories.len() + raw.products.len());
    for c in raw
        .categories
        .iter()
        .chain(&raw.products)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
    {
        if !categories.iter().any(|existing| existing == c) {
            categories.push(c.to_string());
        }
    }
    if categories.is_empty() {
        match raw.main_category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(main) => categories.push(main.to_string()),
            None => messages.push("no categories".to_string()),
        }
    }

    let sentiment = map_sentiment(raw.sentiment.as_ref());
    if sentiment == Sentiment::Excluded && raw.sentiment.is_some() {
        messages.push(format!("unmapped sentiment {:?}", raw.sentiment));
    }

    let source = raw
        .source
        .as_deref()
        .and_then(parse_source_label)
        .unwrap_or_else(|| {
            if !url.is_empty() {
                classify_source(url)
            } else if id.contains("://") {
                classify_source(&id)
            } else {
                Source::Other
            }
        });

    let rating = raw.rating.filter(|r| r.is_finite() && *r > 0.0);

    let text = first_non_blank(&[raw.review_text.as_deref(), raw.text.as_deref()]);
    let location = first_non_blank(&[raw.location.as_deref(), raw.city.as_deref()]).trim();

    let review = Review {
        id,
        date,
        time,
        categories,
        location: location.to_string(),
        sentiment,
        rating,
        title: raw.title.clone().unwrap_or_default(),
        text: text.to_string(),
        source,
        author: raw.author.clone().unwrap_or_default(),
        bank_response: raw.bank_response.unwrap_or(false),
    };
    (review, messages)
}

/// First value that is not blank, or "" when every spelling is absent.
fn first_non_blank<'a>(candidates: &[Option<&'a str>]) -> &'a str {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|v| !v.trim().is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXTERNAL: &str = r#"[
      {
        "url": "https://www.banki.ru/services/responses/bank/response/1/",
        "author": "ivan",
        "location": "Москва ",
        "date": "28.05.2025",
        "time": "14:30",
        "title": "Ипотека",
        "rating": 2,
        "review_text": "Долго рассматривали заявку",
        "bank_response": true,
        "categories": ["Ипотека", "Ипотека", "Кредитование"],
        "main_category": "Ипотека",
        "sentiment": 1
      },
      {
        "url": "https://www.sravni.ru/bank/otzyv/2/",
        "location": "",
        "date": "not a date",
        "time": "",
        "title": "",
        "rating": 0,
        "review_text": "Нормально",
        "categories": [],
        "main_category": "Вклады",
        "sentiment": 0
      }
    ]"#;

    const COMPACT: &str = r#"[
      { "id": "r1", "date": "2025-05-28", "source": "sravni", "products": ["Ипотека"], "sentiment": "negative", "text": "Долго" },
      { "id": 2, "date": "2025-04-02", "source": "other", "products": ["Банковские карты"], "sentiment": "positive", "text": "Кэшбэк пришёл вовремя" }
    ]"#;

    #[test]
    fn test_parse_external_shape() {
        let out = parse_reviews_json(EXTERNAL).unwrap();
        assert_eq!(out.reviews.len(), 2);
        let r = &out.reviews[0];
        assert_eq!(r.id, "https://www.banki.ru/services/responses/bank/response/1/");
        assert_eq!(r.date.unwrap().to_string(), "2025-05-28");
        assert_eq!(r.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(r.categories, vec!["Ипотека", "Кредитование"], "duplicates collapse");
        assert_eq!(r.location, "Москва");
        assert_eq!(r.sentiment, Sentiment::Negative);
        assert_eq!(r.rating, Some(2.0));
        assert_eq!(r.source, Source::Bankiru);
        assert!(r.bank_response);
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let out = parse_reviews_json(EXTERNAL).unwrap();
        let r = &out.reviews[1];
        assert!(r.date.is_none(), "Unparseable date becomes the None sentinel");
        assert_eq!(r.time, NaiveTime::MIN);
        assert_eq!(r.sentiment, Sentiment::Excluded);
        assert_eq!(r.rating, None, "Rating 0 means unrated");
        assert_eq!(r.categories, vec!["Вклады"], "main_category fills empty categories");
        assert_eq!(r.source, Source::Sravni);
        assert!(out.warnings.iter().any(|w| w.index == 1 && w.message.contains("date")));

        let summary = out.import_result();
        assert_eq!(summary.undated_reviews, 1);
        assert_eq!(summary.excluded_sentiment, 1);
    }

    #[test]
    fn test_parse_compact_shape() {
        let out = parse_reviews_json(COMPACT).unwrap();
        assert_eq!(out.reviews.len(), 2);
        assert_eq!(out.reviews[0].source, Source::Sravni);
        assert_eq!(out.reviews[0].categories, vec!["Ипотека"]);
        assert_eq!(out.reviews[1].id, "2");
        assert_eq!(out.reviews[1].sentiment, Sentiment::Positive);
        assert_eq!(out.reviews[1].text, "Кэшбэк пришёл вовремя");
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn test_bad_record_is_skipped() {
        let raw = r#"[{"id": "a", "date": "2025-01-01", "categories": "oops"}, {"id": "b", "date": "2025-01-02"}]"#;
        let out = parse_reviews_json(raw).unwrap();
        assert_eq!(out.reviews.len(), 1);
        assert_eq!(out.skipped_records, 1);
        assert_eq!(out.total_records, 2);
        assert_eq!(out.reviews[0].id, "b");
    }

    #[test]
    fn test_duplicate_id_warns() {
        let raw = r#"[{"id": "a", "date": "2025-01-01", "products": ["X"]}, {"id": "a", "date": "2025-01-02", "products": ["X"]}]"#;
        let out = parse_reviews_json(raw).unwrap();
        assert_eq!(out.reviews.len(), 2);
        assert!(out.warnings.iter().any(|w| w.message.contains("duplicate id")));
    }

    #[test]
    fn test_odd_scalars_degrade_instead_of_skipping() {
        let raw = r#"[
          { "id": "a", "date": "2025-01-01", "products": ["X"], "sentiment": 1.5, "text": "t" },
          { "id": "b", "date": "2025-01-02", "products": ["X"], "sentiment": "negative", "rating": "4" },
          { "id": "c", "date": "2025-01-03", "products": ["X"], "sentiment": 3, "rating": "n/a" }
        ]"#;
        let out = parse_reviews_json(raw).unwrap();
        assert_eq!(out.skipped_records, 0, "{:?}", out.warnings);
        assert_eq!(out.reviews.len(), 3);

        assert_eq!(out.reviews[0].sentiment, Sentiment::Excluded);
        assert!(out.warnings.iter().any(|w| w.index == 0 && w.message.contains("unmapped sentiment")));
        assert_eq!(out.reviews[1].rating, Some(4.0));
        assert_eq!(out.reviews[2].rating, None);
        assert_eq!(out.reviews[2].sentiment, Sentiment::Positive);
        assert_eq!(out.import_result().excluded_sentiment, 1);
    }

    #[test]
    fn test_both_field_spellings_are_merged() {
        let raw = r#"[{
          "id": "a", "date": "2025-01-01",
          "categories": ["Ипотека", "Вклады"], "products": ["Вклады", "Карты"],
          "review_text": "", "text": "Долго",
          "location": " ", "city": "Казань"
        }]"#;
        let out = parse_reviews_json(raw).unwrap();
        assert_eq!(out.skipped_records, 0, "{:?}", out.warnings);
        let r = &out.reviews[0];
        assert_eq!(r.categories, vec!["Ипотека", "Вклады", "Карты"]);
        assert_eq!(r.text, "Долго", "blank review_text falls back to text");
        assert_eq!(r.location, "Казань");
    }

    #[test]
    fn test_empty_and_invalid_documents() {
        assert!(matches!(parse_reviews_json("[]"), Err(AppError::EmptyDataset)));
        assert!(matches!(parse_reviews_json(r#"{"id": 1}"#), Err(AppError::Serde(_))));
    }

    #[test]
    fn test_parse_reviews_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COMPACT.as_bytes()).unwrap();
        let out = parse_reviews_file(file.path()).unwrap();
        assert_eq!(out.reviews.len(), 2);
    }
}
