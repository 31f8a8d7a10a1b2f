use thiserror::Error;

/// Unified error type for the entire networth-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input Validation ────────────────────────────────────────────
    #[error("Record validation failed: {0}")]
    ValidationError(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("No signed-in identity")]
    NotSignedIn,

    // ── Record Store ────────────────────────────────────────────────
    #[error("Store {operation} failed: {message}")]
    Store {
        operation: String,
        message: String,
    },

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: String,
    },

    // ── Export / Import ─────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

impl CoreError {
    /// Shorthand for a store failure on the named operation.
    pub fn store(operation: &str, message: impl Into<String>) -> Self {
        CoreError::Store {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Transient failures that a bounded retry may recover from.
    /// Validation and not-found errors never succeed on a second attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::Store { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full request URL; the summarizer passes
        // its API key as a query parameter, so drop everything after '?'.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
