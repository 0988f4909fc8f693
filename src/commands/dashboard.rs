use serde::{Deserialize, Serialize};

use crate::analyzer::dashboard::Dashboard;
use crate::analyzer::filter::{filter_reviews, reviews_by_source, FilterConfig, SourceColumns};
use crate::nlp::themes::{product_phrases, ProductPhrases};
use crate::parser::deserializers::parse_review_date;
use crate::parser::types::Review;
use crate::state::{AppState, DatasetAccess};

/// Filter as sent by a presentation layer: dates as strings, products as a list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub products: Vec<String>,
    pub query: Option<String>,
    pub city: Option<String>,
}

impl DashboardRequest {
    /// Accepts `YYYY-MM-DD` or `DD.MM.YYYY`. Blank strings mean "unset".
    pub fn into_filter(self) -> Result<FilterConfig, String> {
        Ok(FilterConfig {
            date_from: parse_bound("dateFrom", self.date_from.as_deref())?,
            date_to: parse_bound("dateTo", self.date_to.as_deref())?,
            categories: self
                .products
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            text: self.query,
            city: self.city,
        })
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<Option<chrono::NaiveDate>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => parse_review_date(v)
            .map(Some)
            .ok_or_else(|| format!("Invalid {name}: '{v}'")),
    }
}

/// Full dashboard payload for the active dataset. Memoised per filter.
pub fn get_dashboard(state: &AppState, request: DashboardRequest) -> Result<Dashboard, String> {
    let filter = request.into_filter()?;
    state.dashboard(&filter)
}

/// Praise and complaint phrases for one product, over the filtered subset.
pub fn get_product_phrases(
    state: &AppState,
    request: DashboardRequest,
    product: &str,
) -> Result<ProductPhrases, String> {
    let filter = request.into_filter()?;
    let config = state.config_snapshot()?;
    state.dataset(|d| {
        let subset = filter_reviews(&d.reviews, &filter);
        product_phrases(&subset, product, config.phrase_limit, config.phrase_min_chars)
    })
}

/// Filtered reviews split into one column per source site.
pub fn get_reviews_by_source(state: &AppState, request: DashboardRequest) -> Result<SourceColumns<Review>, String> {
    let filter = request.into_filter()?;
    state.dataset(|d| {
        let owned: Vec<Review> = filter_reviews(&d.reviews, &filter).into_iter().cloned().collect();
        reviews_by_source(&owned)
    })
}
