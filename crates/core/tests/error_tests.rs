// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use networth_tracker_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("Bank amount is required".into());
        assert_eq!(err.to_string(), "Record validation failed: Bank amount is required");
    }

    #[test]
    fn record_not_found() {
        let err = CoreError::RecordNotFound("abc123".into());
        assert_eq!(err.to_string(), "Record not found: abc123");
    }

    #[test]
    fn not_signed_in() {
        assert_eq!(CoreError::NotSignedIn.to_string(), "No signed-in identity");
    }

    #[test]
    fn store() {
        let err = CoreError::store("append", "permission denied");
        assert_eq!(err.to_string(), "Store append failed: permission denied");
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            provider: "Gemini".into(),
            message: "HTTP 429 Too Many Requests".into(),
        };
        assert_eq!(err.to_string(), "API error (Gemini): HTTP 429 Too Many Requests");
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection reset".into());
        assert_eq!(err.to_string(), "Network error: connection reset");
    }

    #[test]
    fn retries_exhausted() {
        let err = CoreError::RetriesExhausted {
            attempts: 3,
            last_error: "Network error: timeout".into(),
        };
        assert_eq!(err.to_string(), "Gave up after 3 attempts: Network error: timeout");
    }

    #[test]
    fn serialization_variants() {
        assert_eq!(
            CoreError::Serialization("bad".into()).to_string(),
            "Serialization error: bad"
        );
        assert_eq!(
            CoreError::Deserialization("eof".into()).to_string(),
            "Deserialization error: eof"
        );
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("disk full".into());
        assert_eq!(err.to_string(), "File I/O error: disk full");
    }
}

// ── Retry classification ────────────────────────────────────────────

mod retryable {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(CoreError::Network("timeout".into()).is_retryable());
        assert!(CoreError::store("subscribe", "unavailable").is_retryable());
    }

    #[test]
    fn permanent_errors_are_not() {
        assert!(!CoreError::ValidationError("x".into()).is_retryable());
        assert!(!CoreError::RecordNotFound("x".into()).is_retryable());
        assert!(!CoreError::NotSignedIn.is_retryable());
        assert!(!CoreError::Api {
            provider: "Gemini".into(),
            message: "x".into()
        }
        .is_retryable());
        assert!(!CoreError::RetriesExhausted {
            attempts: 1,
            last_error: "x".into()
        }
        .is_retryable());
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        match &core_err {
            CoreError::FileIO(msg) => assert!(msg.contains("file not found")),
            other => panic!("Expected FileIO, got {:?}", other),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("");
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Deserialization(msg) => assert!(msg.contains("EOF")),
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn from_reqwest_error_redacts_query() {
        // Nothing listens on port 1, so the request fails before any response.
        let result = reqwest::Client::new()
            .get("http://127.0.0.1:1/v1/models?key=super-secret")
            .send()
            .await;
        let core_err: CoreError = result.unwrap_err().into();
        match &core_err {
            CoreError::Network(msg) => {
                assert!(!msg.contains("super-secret"));
                assert!(msg.contains("<query redacted>"));
            }
            other => panic!("Expected Network, got {:?}", other),
        }
    }

    #[test]
    fn question_mark_propagates_io() {
        fn read() -> Result<String, CoreError> {
            Ok(std::fs::read_to_string("/definitely/not/here.json")?)
        }
        assert!(matches!(read(), Err(CoreError::FileIO(_))));
    }
}
