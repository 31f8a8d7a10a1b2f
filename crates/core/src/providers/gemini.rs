use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::chart::AggregatedDay;
use super::traits::Summarizer;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Key under which the Gemini API key is stored in `Settings::api_keys`.
pub const API_KEY_NAME: &str = "gemini";

/// Google Gemini text-generation provider.
///
/// - **Requires**: API key (set via settings as "gemini").
/// - **Endpoint**: `POST /models/{model}:generateContent?key=...`
/// - **Use**: a short narrative over the most recent aggregated days.
///   Failures are reported to the user and never affect the derived views.
#[derive(Clone)]
pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: String, model: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            api_key,
            model: model.into(),
        }
    }

    /// Build from the configured API keys; `None` when no Gemini key is set.
    pub fn from_api_keys(api_keys: &HashMap<String, String>) -> Option<Self> {
        api_keys
            .get(API_KEY_NAME)
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(key.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Prompt text sent to the model: one line per day, oldest first.
    pub fn build_prompt(days: &[AggregatedDay]) -> String {
        let mut prompt = String::from(
            "You are a personal finance assistant. Below are dated net-worth snapshots \
             (bank deposits, brokerage, total). Summarize the trend in three short \
             sentences and point out any notable change in allocation.\n\n",
        );
        for day in days {
            prompt.push_str(&format!(
                "{}: bank {:.0}, brokerage {:.0}, total {:.0}\n",
                day.date_key(),
                day.bank,
                day.stock,
                day.total
            ));
        }
        prompt
    }

    /// Pull the generated text out of a `generateContent` response.
    pub fn extract_text(response: GenerateResponse) -> Result<String, CoreError> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CoreError::Api {
                provider: "Gemini".into(),
                message: "Response contained no text".into(),
            });
        }
        Ok(text.trim().to_string())
    }
}

// ── Gemini API request/response types ───────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Summarizer for GeminiSummarizer {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn summarize(&self, days: &[AggregatedDay]) -> Result<String, CoreError> {
        let url = format!("{BASE_URL}/{}:generateContent?key={}", self.model, self.api_key);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(days),
                }],
            }],
        };

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: "Gemini".into(),
                message: format!("HTTP {status}"),
            });
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: "Gemini".into(),
            message: format!("Failed to parse response: {e}"),
        })?;

        Self::extract_text(parsed)
    }
}
