use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use review_pulse::commands::dashboard::DashboardRequest;
use review_pulse::commands::{config, dashboard, import};
use review_pulse::{load_config, AnalyticsConfig, AppState};

/// Review Pulse - sentiment and theme dashboard over a JSON review dataset
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON array of review records
    dataset: PathBuf,

    /// Earliest review date, YYYY-MM-DD or DD.MM.YYYY (inclusive)
    #[arg(long)]
    from: Option<String>,

    /// Latest review date, YYYY-MM-DD or DD.MM.YYYY (inclusive)
    #[arg(long)]
    to: Option<String>,

    /// Product/category to keep (repeatable)
    #[arg(short, long = "product")]
    products: Vec<String>,

    /// Case-insensitive substring searched in title and text
    #[arg(short, long)]
    query: Option<String>,

    /// Case-insensitive substring searched in the location
    #[arg(long)]
    city: Option<String>,

    /// Path to a JSON analytics config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Config override as key=value, applied after --config (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Print praise/complaint phrases for this product instead of the dashboard
    #[arg(long, value_name = "PRODUCT")]
    phrases: Option<String>,

    /// Print the filtered reviews split by source site instead of the dashboard
    #[arg(long, conflicts_with = "phrases")]
    by_source: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let base = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("reading config {}", path.display()))?,
        None => AnalyticsConfig::default(),
    };
    let state = AppState::new(base);
    config::set_config_values(&state, &args.overrides).map_err(anyhow::Error::msg)?;

    let dataset = args.dataset.to_string_lossy();
    let summary = import::load_reviews_file(&state, &dataset)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("loading {dataset}"))?;
    log::info!(
        "loaded {} reviews ({} skipped, {} warnings)",
        summary.import.total_reviews,
        summary.import.skipped_records,
        summary.import.warnings.len()
    );

    let request = DashboardRequest {
        date_from: args.from,
        date_to: args.to,
        products: args.products,
        query: args.query,
        city: args.city,
    };

    let payload = if let Some(product) = args.phrases.as_deref() {
        serde_json::to_value(dashboard::get_product_phrases(&state, request, product).map_err(anyhow::Error::msg)?)?
    } else if args.by_source {
        serde_json::to_value(dashboard::get_reviews_by_source(&state, request).map_err(anyhow::Error::msg)?)?
    } else {
        serde_json::to_value(dashboard::get_dashboard(&state, request).map_err(anyhow::Error::msg)?)?
    };

    let out = if args.pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };
    println!("{out}");
    Ok(())
}
