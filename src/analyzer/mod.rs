pub mod dashboard;
pub mod filter;
pub mod geo;
pub mod sentiment;
pub mod stats;
pub mod temporal;

pub use dashboard::{build_dashboard, Dashboard, DashboardMeta};
pub use filter::{filter_reviews, reviews_by_source, source_counts, FilterConfig, SourceColumns, SourceCounts};
pub use sentiment::{aggregate_by_category, aggregate_by_month, product_sentiments, trend_shares, SentimentAggregate};
