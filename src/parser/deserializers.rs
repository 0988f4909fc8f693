use chrono::{NaiveDate, NaiveTime};

use super::types::{RawSentiment, Sentiment, Source};

const RU_DATE_FMT: &str = "%d.%m.%Y";
const ISO_DATE_FMT: &str = "%Y-%m-%d";

/// Parse a review date in either `DD.MM.YYYY` or ISO `YYYY-MM-DD` form.
/// Returns None for empty or unparseable strings.
pub fn parse_review_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, RU_DATE_FMT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_DATE_FMT))
        .ok()
}

/// "28.05.2025" → "2025-05-28". ISO input passes through.
pub fn ru_to_iso(s: &str) -> Option<String> {
    parse_review_date(s).map(|d| d.format(ISO_DATE_FMT).to_string())
}

/// Parse a clock time "HH:MM" (seconds tolerated).
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Legacy numeric encoding: 0 = unlabelled, 1 = negative, 2 = neutral, 3 = positive.
pub fn map_sentiment_code(code: i64) -> Sentiment {
    match code {
        1 => Sentiment::Negative,
        2 => Sentiment::Neutral,
        3 => Sentiment::Positive,
        _ => Sentiment::Excluded,
    }
}

/// Canonical English labels, plus the Russian labels emitted by the inference service.
pub fn map_sentiment_label(label: &str) -> Sentiment {
    match label.trim().to_lowercase().as_str() {
        "positive" | "положительно" => Sentiment::Positive,
        "neutral" | "нейтрально" => Sentiment::Neutral,
        "negative" | "отрицательно" => Sentiment::Negative,
        other => match other.parse::<i64>() {
            Ok(code) => map_sentiment_code(code),
            Err(_) => Sentiment::Excluded,
        },
    }
}

pub fn map_sentiment(raw: Option<&RawSentiment>) -> Sentiment {
    match raw {
        Some(RawSentiment::Code(code)) => map_sentiment_code(*code),
        Some(RawSentiment::Label(label)) => map_sentiment_label(label),
        Some(RawSentiment::Other(_)) | None => Sentiment::Excluded,
    }
}

/// Host part of a URL: "https://www.banki.ru/services/…" → "www.banki.ru".
pub fn url_host(url: &str) -> &str {
    let trimmed = url.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let end = without_scheme
        .find(|c| c == '/' || c == '?' || c == '#')
        .unwrap_or(without_scheme.len());
    let host = &without_scheme[..end];
    // strip userinfo and port
    let host = host.rsplit_once('@').map(|(_, h)| h).unwrap_or(host);
    host.split(':').next().unwrap_or(host)
}

/// Classify the originating site by substring on the URL's domain.
pub fn classify_source(url: &str) -> Source {
    let host = url_host(url).to_lowercase();
    if host.contains("sravni") {
        Source::Sravni
    } else if host.contains("banki.ru") || host.contains("bankiru") {
        Source::Bankiru
    } else {
        Source::Other
    }
}

/// Explicit source label ("sravni" / "bankiru" / "other").
pub fn parse_source_label(label: &str) -> Option<Source> {
    match label.trim().to_lowercase().as_str() {
        "sravni" => Some(Source::Sravni),
        "bankiru" | "banki.ru" => Some(Source::Bankiru),
        "other" => Some(Source::Other),
        _ => None,
    }
}

/// Serde-compatible deserializers for use with `#[serde(deserialize_with = "de::...")]`.
pub mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Int(i64),
        Float(f64),
    }

    /// "r1" → Some("r1"), 17 → Some("17"), null → None
    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<StringOrNumber>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            StringOrNumber::Str(s) if s.trim().is_empty() => None,
            StringOrNumber::Str(s) => Some(s.trim().to_string()),
            StringOrNumber::Int(i) => Some(i.to_string()),
            StringOrNumber::Float(f) => Some(f.to_string()),
        }))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum LenientNumber {
        Num(f64),
        Str(String),
        Other(serde::de::IgnoredAny),
    }

    /// 4 → Some(4.0), "4,5" → Some(4.5), "n/a" / true / [] / null → None
    pub fn opt_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<LenientNumber>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            LenientNumber::Num(n) => Some(n),
            LenientNumber::Str(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            LenientNumber::Other(_) => None,
        }))
    }
}
