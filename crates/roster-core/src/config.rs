//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every table and
//! field is optional; missing values fall back to the defaults below.

use crate::error::{Result, RosterError};
use crate::query::{DEFAULT_PAGE_SIZE, DEFAULT_SORT_FIELD};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RootConfig {
    pub api: ApiConfig,
    pub store: StoreConfig,
}

impl RootConfig {
    /// Rejects values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.api.failure_rate) {
            return Err(RosterError::config(format!(
                "api.failure_rate must be within 0.0..=1.0, got {}",
                self.api.failure_rate
            )));
        }
        if self.api.latency_min_ms > self.api.latency_max_ms {
            return Err(RosterError::config(
                "api.latency_min_ms must not exceed api.latency_max_ms",
            ));
        }
        if self.store.page_size == 0 {
            return Err(RosterError::config("store.page_size must be greater than 0"));
        }
        if !self.store.export_delimiter.is_ascii() {
            return Err(RosterError::config("store.export_delimiter must be ASCII"));
        }
        Ok(())
    }
}

/// Settings of the in-memory mock user API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Lower bound of the simulated latency
    pub latency_min_ms: u64,
    /// Upper bound of the simulated latency
    pub latency_max_ms: u64,
    /// Probability (0.0..=1.0) that a call fails with a service error
    pub failure_rate: f64,
    /// Number of generated users
    pub seed_count: usize,
    /// RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: 300,
            latency_max_ms: 800,
            failure_rate: 0.05,
            seed_count: 55,
            seed: None,
        }
    }
}

impl ApiConfig {
    /// No latency, no random failures. Used by tests.
    pub fn instant(seed_count: usize) -> Self {
        Self {
            latency_min_ms: 0,
            latency_max_ms: 0,
            failure_rate: 0.0,
            seed_count,
            seed: Some(7),
        }
    }
}

/// Settings of the synchronized collection store.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub page_size: u32,
    pub sort_field: String,
    pub export_delimiter: char,
    pub search_debounce_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            export_delimiter: ',',
            search_debounce_ms: 500,
        }
    }
}
