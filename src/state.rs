use std::sync::Mutex;

use crate::analyzer::dashboard::{build_dashboard, Dashboard};
use crate::analyzer::filter::FilterConfig;
use crate::config::AnalyticsConfig;
use crate::parser::types::Review;

/// Loaded review collection. `version` changes on every load.
pub struct Dataset {
    pub reviews: Vec<Review>,
    pub version: u64,
}

struct CachedDashboard {
    filter: FilterConfig,
    version: u64,
    config: AnalyticsConfig,
    dashboard: Dashboard,
}

/// Shared state behind the command layer.
///
/// Lock order: dataset, then config, then cache.
pub struct AppState {
    pub dataset: Mutex<Option<Dataset>>,
    pub config: Mutex<AnalyticsConfig>,
    cache: Mutex<Option<CachedDashboard>>,
}

pub trait DatasetAccess {
    fn dataset<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Dataset) -> T;
}

impl DatasetAccess for AppState {
    fn dataset<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Dataset) -> T,
    {
        let guard = self.dataset.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        let dataset = guard.as_ref().ok_or("No dataset loaded")?;
        Ok(f(dataset))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl AppState {
    pub fn new(config: AnalyticsConfig) -> Self {
        AppState {
            dataset: Mutex::new(None),
            config: Mutex::new(config),
            cache: Mutex::new(None),
        }
    }

    /// Swaps in a new review collection and drops the memoised dashboard.
    pub fn replace_dataset(&self, reviews: Vec<Review>) -> Result<u64, String> {
        let mut guard = self.dataset.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        let version = guard.as_ref().map_or(1, |d| d.version + 1);
        *guard = Some(Dataset { reviews, version });
        self.invalidate()?;
        Ok(version)
    }

    pub fn config_snapshot(&self) -> Result<AnalyticsConfig, String> {
        let guard = self.config.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        Ok(guard.clone())
    }

    pub fn set_config(&self, config: AnalyticsConfig) -> Result<(), String> {
        let mut guard = self.config.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        *guard = config;
        drop(guard);
        self.invalidate()
    }

    /// Dashboard for `filter`, reused while the filter, dataset version and
    /// config all match the memoised entry.
    pub fn dashboard(&self, filter: &FilterConfig) -> Result<Dashboard, String> {
        let guard = self.dataset.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        let dataset = guard.as_ref().ok_or("No dataset loaded")?;
        let config = self.config_snapshot()?;

        let mut cache = self.cache.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        if let Some(hit) = cache
            .as_ref()
            .filter(|c| c.version == dataset.version && &c.filter == filter && c.config == config)
        {
            log::debug!("dashboard cache hit (dataset v{})", dataset.version);
            return Ok(hit.dashboard.clone());
        }

        let dashboard = build_dashboard(&dataset.reviews, filter, &config);
        *cache = Some(CachedDashboard {
            filter: filter.clone(),
            version: dataset.version,
            config,
            dashboard: dashboard.clone(),
        });
        Ok(dashboard)
    }

    /// `true` if the next `dashboard(filter)` call would be served from the memo.
    pub fn is_cached(&self, filter: &FilterConfig) -> bool {
        let Ok(dataset) = self.dataset.lock() else {
            return false;
        };
        let Some(version) = dataset.as_ref().map(|d| d.version) else {
            return false;
        };
        let Ok(config) = self.config_snapshot() else {
            return false;
        };
        let Ok(cache) = self.cache.lock() else {
            return false;
        };
        cache
            .as_ref()
            .is_some_and(|c| c.version == version && &c.filter == filter && c.config == config)
    }

    fn invalidate(&self) -> Result<(), String> {
        let mut cache = self.cache.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        *cache = None;
        Ok(())
    }
}
