use chrono::NaiveDate;
use serde::Serialize;

use crate::parser::pipeline::ParseOutput;
use crate::parser::types::ImportResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub dataset_version: u64,
    #[serde(flatten)]
    pub import: ImportResult,
    pub date_range_from: Option<NaiveDate>,
    pub date_range_to: Option<NaiveDate>,
}

/// Loads a JSON review file and makes it the active dataset.
pub fn load_reviews_file(state: &AppState, path: &str) -> Result<LoadSummary, String> {
    let output = crate::parser::parse_reviews_file(path).map_err(|e| e.to_string())?;
    install(state, output)
}

/// Same as [`load_reviews_file`] for a JSON document already in memory.
pub fn load_reviews_json(state: &AppState, raw: &str) -> Result<LoadSummary, String> {
    let output = crate::parser::parse_reviews_json(raw).map_err(|e| e.to_string())?;
    install(state, output)
}

fn install(state: &AppState, output: ParseOutput) -> Result<LoadSummary, String> {
    let import = output.import_result();

    // Date range over dated reviews only
    let date_range_from = output.reviews.iter().filter_map(|r| r.date).min();
    let date_range_to = output.reviews.iter().filter_map(|r| r.date).max();

    let dataset_version = state.replace_dataset(output.reviews)?;

    Ok(LoadSummary {
        dataset_version,
        import,
        date_range_from,
        date_range_to,
    })
}
