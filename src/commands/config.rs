use crate::config::AnalyticsConfig;
use crate::state::AppState;

pub fn get_config(state: &AppState) -> Result<AnalyticsConfig, String> {
    state.config_snapshot()
}

/// Replaces the whole config. The memoised dashboard is dropped.
pub fn update_config(state: &AppState, config: AnalyticsConfig) -> Result<(), String> {
    state.set_config(config)
}

/// Applies `key=value` overrides on top of the current config.
pub fn set_config_values(state: &AppState, assignments: &[String]) -> Result<AnalyticsConfig, String> {
    let mut config = state.config_snapshot()?;
    for assignment in assignments {
        config.apply_assignment(assignment).map_err(|e| e.to_string())?;
    }
    state.set_config(config.clone())?;
    Ok(config)
}
