use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// Bounded retry configuration (sign-in and the initial subscription).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles on every further attempt
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

/// User-configurable settings for the dashboard core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows per history table page.
    pub page_size: usize,

    /// Label for records whose institution name is blank.
    pub uncategorized_label: String,

    /// Asset-class label for bank deposits.
    pub bank_label: String,

    /// Asset-class label for brokerage holdings.
    pub brokerage_label: String,

    /// How long a notification banner stays visible.
    pub notification_ttl_secs: u64,

    /// How many of the most recent aggregated days go to the summarizer.
    pub summary_window_days: usize,

    pub retry: RetrySettings,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "gemini").
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: 5,
            uncategorized_label: "Uncategorized".to_string(),
            bank_label: "Bank Deposits".to_string(),
            brokerage_label: "Brokerage".to_string(),
            notification_ttl_secs: 3,
            summary_window_days: 12,
            retry: RetrySettings::default(),
            api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    /// Reject settings the derivations cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_size == 0 {
            return Err(CoreError::ValidationError(
                "page_size must be at least 1".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(CoreError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.summary_window_days == 0 {
            return Err(CoreError::ValidationError(
                "summary_window_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }
}
