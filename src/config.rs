use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::nlp::preprocessing::StopWordFilter;
use crate::nlp::themes::FontRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    pub word_cloud_limit: usize,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub theme_limit: usize,
    pub phrase_limit: usize,
    pub phrase_min_chars: usize,
    pub city_top_n: usize,
    pub anomaly_sigma: f64,
    pub min_token_chars: usize,
    pub extra_stop_words: Vec<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            word_cloud_limit: 40,
            min_font_size: 12.0,
            max_font_size: 36.0,
            theme_limit: 5,
            phrase_limit: 6,
            phrase_min_chars: 5,
            city_top_n: 20,
            anomaly_sigma: 2.0,
            min_token_chars: 3,
            extra_stop_words: Vec::new(),
        }
    }
}

/// Reads a JSON config file. Keys absent from the file keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalyticsConfig, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<AnalyticsConfig, AppError> {
    if raw.trim().is_empty() {
        return Ok(AnalyticsConfig::default());
    }
    Ok(serde_json::from_str(raw)?)
}

impl AnalyticsConfig {
    /// Sets one key from its string form, e.g. `("themeLimit", "10")`.
    ///
    /// `extraStopWords` takes either a JSON array or a comma-separated list.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        match key {
            "wordCloudLimit" => self.word_cloud_limit = parse_value(key, value)?,
            "minFontSize" => self.min_font_size = parse_value(key, value)?,
            "maxFontSize" => self.max_font_size = parse_value(key, value)?,
            "themeLimit" => self.theme_limit = parse_value(key, value)?,
            "phraseLimit" => self.phrase_limit = parse_value(key, value)?,
            "phraseMinChars" => self.phrase_min_chars = parse_value(key, value)?,
            "cityTopN" => self.city_top_n = parse_value(key, value)?,
            "anomalySigma" => self.anomaly_sigma = parse_value(key, value)?,
            "minTokenChars" => self.min_token_chars = parse_value(key, value)?,
            "extraStopWords" => {
                self.extra_stop_words = if value.starts_with('[') {
                    serde_json::from_str(value).map_err(|_| invalid(key, value))?
                } else {
                    value
                        .split(',')
                        .map(|w| w.trim().to_lowercase())
                        .filter(|w| !w.is_empty())
                        .collect()
                }
            }
            _ => return Err(AppError::UnknownConfigKey(key.to_string())),
        }
        Ok(())
    }

    /// Parses `key=value` and applies it.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), AppError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| AppError::Custom(format!("Expected key=value, got '{assignment}'")))?;
        self.apply_override(key.trim(), value)
    }

    /// Fixed stop words plus the configured extras and length rule.
    pub fn stop_word_filter(&self) -> StopWordFilter {
        let mut filter = StopWordFilter::new().with_min_chars(self.min_token_chars);
        filter.add_words(&self.extra_stop_words);
        filter
    }

    pub fn font_range(&self) -> FontRange {
        FontRange {
            min: self.min_font_size,
            max: self.max_font_size,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> AppError {
    AppError::InvalidConfigValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
