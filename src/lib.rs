pub mod analytics;
pub mod analyzer;
pub mod commands;
pub mod config;
pub mod error;
pub mod nlp;
pub mod parser;
pub mod state;

pub use analyzer::dashboard::{build_dashboard, Dashboard};
pub use analyzer::filter::FilterConfig;
pub use config::{load_config, AnalyticsConfig};
pub use error::AppError;
pub use parser::types::{Review, Sentiment, Source};
pub use state::AppState;

// ─── E2E Integration Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;

    use crate::analyzer::dashboard::build_dashboard;
    use crate::analyzer::filter::{filter_reviews, FilterConfig};
    use crate::config::AnalyticsConfig;
    use crate::parser::types::{Review, Sentiment};

    /// Both record shapes, a spike of negatives on 2025-03-10 and a few malformed rows.
    fn fixture_json() -> String {
        let mut records = Vec::new();
        for day in 1..=9 {
            records.push(serde_json::json!({
                "url": format!("https://www.banki.ru/services/responses/bank/response/{day}/"),
                "author": "user",
                "location": if day % 2 == 0 { "Москва" } else { "Казань" },
                "date": format!("{:02}.03.2025", day),
                "time": "09:30",
                "title": "Ипотека",
                "rating": 1,
                "review_text": "Долго рассматривали заявку на ипотеку",
                "bank_response": true,
                "categories": ["Ипотека"],
                "main_category": "Ипотека",
                "sentiment": 1
            }));
        }
        for i in 0..10 {
            records.push(serde_json::json!({
                "id": format!("spike-{i}"),
                "date": "2025-03-10",
                "time": "18:05",
                "source": "sravni",
                "products": ["Банковские карты"],
                "sentiment": "negative",
                "text": "Приложение зависает при оплате картой",
                "location": "Москва"
            }));
        }
        for i in 0..4 {
            records.push(serde_json::json!({
                "id": format!("pos-{i}"),
                "date": "2025-04-02",
                "products": ["Банковские карты", "Вклады"],
                "sentiment": "positive",
                "text": "Кэшбэк пришёл вовремя, удобное приложение",
                "rating": 5,
                "location": "Тула"
            }));
        }
        records.push(serde_json::json!({
            "id": "broken-date",
            "date": "вчера",
            "products": ["Вклады"],
            "sentiment": 0,
            "text": "Без даты"
        }));
        records.push(serde_json::json!({ "id": "bad", "categories": 42 }));
        serde_json::Value::Array(records).to_string()
    }

    fn load() -> Vec<Review> {
        crate::parser::parse_reviews_json(&fixture_json())
            .expect("fixture parses")
            .reviews
    }

    /// E2E: file → parse → state → dashboard, checked across modules
    #[test]
    fn test_e2e_file_to_dashboard() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(fixture_json().as_bytes()).unwrap();

        let state = crate::state::AppState::default();
        let summary = crate::commands::import::load_reviews_file(&state, file.path().to_str().unwrap())
            .expect("load failed");
        assert_eq!(summary.import.total_reviews, 24);
        assert_eq!(summary.import.skipped_records, 1, "Record with non-list categories is skipped");
        assert_eq!(summary.import.undated_reviews, 1);

        let dashboard =
            crate::commands::dashboard::get_dashboard(&state, Default::default()).expect("dashboard failed");

        assert_eq!(dashboard.meta.total_reviews, 24);
        assert_eq!(dashboard.meta.filtered_reviews, 24);

        // Products sorted by negative share
        let names: Vec<&str> = dashboard.products.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(names, vec!["Ипотека", "Банковские карты", "Вклады"]);
        for p in &dashboard.products {
            assert!((-1.0..=1.0).contains(&p.score), "score out of bounds: {p:?}");
            if p.total > 0 {
                let sum = p.positive + p.neutral + p.negative;
                assert!(sum <= 102, "{p:?}");
            }
        }

        // Timeline skips the undated review
        let months: Vec<&str> = dashboard.timeline.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(months, vec!["2025-03", "2025-04"]);
        assert_eq!(dashboard.timeline[0].counts.negative, 19);

        // Anomaly: the spike day only
        assert_eq!(dashboard.anomalies.len(), 1);
        assert_eq!(dashboard.anomalies[0].date.to_string(), "2025-03-10");
        assert_eq!(dashboard.anomalies[0].count, 10);
        assert_eq!(dashboard.anomalies[0].threshold, 7.3);

        // Heatmap: 2025-03-10 is a Monday
        assert_eq!(dashboard.heatmap.cell(0, 18).count, 10);
        assert_eq!(dashboard.heatmap.cell(0, 18).neg_count, 10);
        assert_eq!(dashboard.heatmap.total(), 23);

        // Cities
        assert_eq!(dashboard.cities[0].city, "Москва");
        assert_eq!(dashboard.cities[0].total, 14);
        let tula = dashboard.cities.iter().find(|c| c.city == "Тула").unwrap();
        assert_eq!(tula.avg_rating, 5.0);
        assert_eq!(tula.neg_pct, 0.0);

        // Sources
        assert_eq!(dashboard.source_counts.bankiru, 9);
        assert_eq!(dashboard.source_counts.sravni, 10);
        assert_eq!(dashboard.source_counts.other, 5);

        // Text analytics
        for entry in &dashboard.word_cloud {
            assert!((12.0..=36.0).contains(&entry.size), "{entry:?}");
        }
        assert_eq!(dashboard.word_cloud[0].word, "приложение");
        assert!(dashboard.negative_themes.iter().any(|t| t.theme == "приложение зависает"));
        assert!(dashboard.positive_themes.iter().any(|t| t.theme == "кэшбэк"));

        // Memoised for the same filter
        assert!(state.is_cached(&FilterConfig::default()));
    }

    /// E2E: every derived structure is empty when the date range excludes everything
    #[test]
    fn test_e2e_out_of_range_filter_is_empty() {
        let reviews = load();
        let filter = FilterConfig {
            date_from: chrono::NaiveDate::from_ymd_opt(2030, 1, 1),
            date_to: chrono::NaiveDate::from_ymd_opt(2030, 12, 31),
            ..Default::default()
        };
        let dashboard = build_dashboard(&reviews, &filter, &AnalyticsConfig::default());
        assert_eq!(dashboard.meta.filtered_reviews, 0);
        assert!(dashboard.products.is_empty());
        assert!(dashboard.timeline.is_empty());
        assert!(dashboard.trend_shares.is_empty());
        assert!(dashboard.word_cloud.is_empty());
        assert!(dashboard.positive_themes.is_empty());
        assert!(dashboard.negative_themes.is_empty());
        assert!(dashboard.cities.is_empty());
        assert_eq!(dashboard.heatmap.total(), 0);
        assert!(dashboard.anomalies.is_empty());
    }

    /// E2E: same input, same output; the input collection is untouched
    #[test]
    fn test_e2e_idempotent() {
        let reviews = load();
        let snapshot = reviews.clone();
        let config = AnalyticsConfig::default();
        let filter = FilterConfig {
            text: Some("ПРИЛОЖЕНИЕ".to_string()),
            ..Default::default()
        };

        let a = serde_json::to_value(build_dashboard(&reviews, &filter, &config)).unwrap();
        let b = serde_json::to_value(build_dashboard(&reviews, &filter, &config)).unwrap();
        let strip = |mut v: serde_json::Value| {
            v["meta"]["computeDurationMs"] = serde_json::Value::Null;
            v
        };
        assert_eq!(strip(a), strip(b));
        assert_eq!(reviews, snapshot);
    }

    /// E2E: every review kept by the filter satisfies every configured predicate
    #[test]
    fn test_e2e_filter_conjunction() {
        let reviews = load();
        let filter = FilterConfig {
            date_from: chrono::NaiveDate::from_ymd_opt(2025, 3, 5),
            date_to: chrono::NaiveDate::from_ymd_opt(2025, 3, 31),
            categories: ["Банковские карты".to_string(), "Ипотека".to_string()].into_iter().collect(),
            text: Some("приложение".to_string()),
            city: Some("моск".to_string()),
        };
        let subset = filter_reviews(&reviews, &filter);
        assert_eq!(subset.len(), 10);
        for r in &subset {
            let date = r.date.unwrap();
            assert!(date >= filter.date_from.unwrap() && date <= filter.date_to.unwrap());
            assert!(r.categories.iter().any(|c| filter.categories.contains(c)));
            assert!(r.text.to_lowercase().contains("приложение"));
            assert!(r.location.to_lowercase().contains("моск"));
            assert_eq!(r.sentiment, Sentiment::Negative);
        }
    }

    /// E2E: config file overrides flow through to the dashboard
    #[test]
    fn test_e2e_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = r#"{ "wordCloudLimit": 3, "anomalySigma": 10.0, "extraStopWords": ["приложение"] }"#;
        file.write_all(raw.as_bytes()).unwrap();
        let config = crate::config::load_config(file.path()).unwrap();
        assert_eq!(config.theme_limit, 5, "Missing keys keep defaults");

        let reviews = load();
        let dashboard = build_dashboard(&reviews, &FilterConfig::default(), &config);
        assert_eq!(dashboard.word_cloud.len(), 3);
        assert!(dashboard.word_cloud.iter().all(|w| w.word != "приложение"));
        assert!(dashboard.anomalies.is_empty(), "σ multiplier of 10 flags nothing");
    }
}
