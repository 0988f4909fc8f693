//! Review dashboard: every derived structure over one filtered subset.

use std::time::Instant;

use serde::Serialize;

use super::filter::{filter_reviews, source_counts, FilterConfig, SourceCounts};
use super::geo::{city_table, CityRow};
use super::sentiment::{
    aggregate_by_month, product_sentiments, trend_shares, ProductSentiment, TimelineBucket, TrendShare,
};
use super::temporal::{time_heatmap, TimeHeatmap};
use crate::analytics::anomalies::{detect_anomalies, AnomalyRow};
use crate::config::AnalyticsConfig;
use crate::nlp::themes::{word_cloud, ThemeEntry, ThemeTable, WordCloudEntry};
use crate::parser::types::{Review, Sentiment};

// ─── Data Structures ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub meta: DashboardMeta,
    pub products: Vec<ProductSentiment>,
    pub timeline: Vec<TimelineBucket>,
    pub trend_shares: Vec<TrendShare>,
    pub word_cloud: Vec<WordCloudEntry>,
    pub positive_themes: Vec<ThemeEntry>,
    pub negative_themes: Vec<ThemeEntry>,
    pub cities: Vec<CityRow>,
    pub heatmap: TimeHeatmap,
    pub anomalies: Vec<AnomalyRow>,
    pub source_counts: SourceCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    pub total_reviews: usize,
    pub filtered_reviews: usize,
    pub compute_duration_ms: u64,
}

/// Filters `reviews` once, then derives every dashboard section from the subset.
///
/// Pure: the input slice is never mutated and nothing is cached here.
pub fn build_dashboard(reviews: &[Review], filter: &FilterConfig, config: &AnalyticsConfig) -> Dashboard {
    let start = Instant::now();

    let subset = filter_reviews(reviews, filter);
    let stop_words = config.stop_word_filter();

    let timeline = aggregate_by_month(&subset);
    let trend = trend_shares(&timeline);
    let themes = ThemeTable::build(&subset, &stop_words);

    let mut meta = DashboardMeta {
        total_reviews: reviews.len(),
        filtered_reviews: subset.len(),
        compute_duration_ms: 0, // filled below
    };

    let products = product_sentiments(&subset, &filter.categories);
    let cloud = word_cloud(&subset, &stop_words, config.word_cloud_limit, config.font_range());
    let positive_themes = themes.top(Sentiment::Positive, config.theme_limit);
    let negative_themes = themes.top(Sentiment::Negative, config.theme_limit);
    let cities = city_table(&subset, config.city_top_n);
    let heatmap = time_heatmap(&subset);
    let anomalies = detect_anomalies(&subset, config.anomaly_sigma);
    let sources = source_counts(&subset);

    meta.compute_duration_ms = start.elapsed().as_millis() as u64;
    log::debug!(
        "dashboard: {} of {} reviews, {} products, {} anomalies in {} ms",
        meta.filtered_reviews,
        meta.total_reviews,
        products.len(),
        anomalies.len(),
        meta.compute_duration_ms
    );

    Dashboard {
        meta,
        products,
        timeline,
        trend_shares: trend,
        word_cloud: cloud,
        positive_themes,
        negative_themes,
        cities,
        heatmap,
        anomalies,
        source_counts: sources,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
