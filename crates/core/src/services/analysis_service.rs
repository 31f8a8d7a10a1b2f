use log::{debug, error};

use crate::errors::CoreError;
use crate::models::chart::DailySeries;
use crate::providers::traits::Summarizer;

/// Asks a text-generation provider for a narrative over the latest days.
pub struct AnalysisService {
    window_days: usize,
}

impl AnalysisService {
    pub fn new(window_days: usize) -> Self {
        Self {
            window_days: window_days.max(1),
        }
    }

    pub async fn analyze(
        &self,
        summarizer: &dyn Summarizer,
        series: &DailySeries,
    ) -> Result<String, CoreError> {
        if series.is_empty() {
            return Err(CoreError::ValidationError(
                "No snapshot data to analyze".into(),
            ));
        }

        let days = series.recent(self.window_days);
        debug!("Requesting summary of {} day(s) from {}", days.len(), summarizer.name());

        summarizer.summarize(days).await.inspect_err(|e| {
            error!("Analysis via {} failed: {e}", summarizer.name());
        })
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new(12)
    }
}
