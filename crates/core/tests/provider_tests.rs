// ═══════════════════════════════════════════════════════════════════
// Provider Tests — MemoryRecordStore, RecordSubscription,
// StaticIdentityProvider, GeminiSummarizer request/response logic
// ═══════════════════════════════════════════════════════════════════

use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::time::Duration;

use networth_tracker_core::errors::CoreError;
use networth_tracker_core::models::chart::AggregatedDay;
use networth_tracker_core::models::identity::Identity;
use networth_tracker_core::models::record::{NewRecord, SnapshotRecord};
use networth_tracker_core::providers::gemini::{
    Candidate, Content, GeminiSummarizer, GenerateResponse, Part,
};
use networth_tracker_core::providers::memory_store::MemoryRecordStore;
use networth_tracker_core::providers::static_identity::StaticIdentityProvider;
use networth_tracker_core::providers::traits::{IdentityProvider, RecordStore, Summarizer};

// ═══════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn new_record(institution: &str, bank: f64, stock: f64) -> NewRecord {
    NewRecord {
        date: d(2024, 1, 5),
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        institution: institution.into(),
        bank,
        stock,
        note: None,
    }
}

fn text_response(parts: &[&str]) -> GenerateResponse {
    GenerateResponse {
        candidates: vec![Candidate {
            content: Content {
                parts: parts.iter().map(|t| Part { text: t.to_string() }).collect(),
            },
        }],
    }
}

// ═══════════════════════════════════════════════════════════════════
// MemoryRecordStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn name() {
        assert_eq!(MemoryRecordStore::new().name(), "Memory");
    }

    #[test]
    fn unknown_identity_has_no_records() {
        let store = MemoryRecordStore::default();
        assert!(store.records(&Identity::new("nobody")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_assigns_unique_ids() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        let a = store.append(&me, new_record("A", 1.0, 0.0)).await.unwrap();
        let b = store.append(&me, new_record("B", 2.0, 0.0)).await.unwrap();
        assert_ne!(a, b);

        let records = store.records(&me).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, a);
        assert_eq!(records[0].institution, "A");
        assert_eq!(records[1].id, b);
    }

    #[tokio::test]
    async fn collections_are_isolated_per_identity() {
        let store = MemoryRecordStore::new();
        let alice = Identity::new("alice");
        let bob = Identity::new("bob");
        let id = store.append(&alice, new_record("A", 1.0, 0.0)).await.unwrap();

        assert!(store.records(&bob).unwrap().is_empty());
        assert!(matches!(
            store.remove(&bob, &id).await,
            Err(CoreError::RecordNotFound(_))
        ));
        assert_eq!(store.records(&alice).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_only_target() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        let a = store.append(&me, new_record("A", 1.0, 0.0)).await.unwrap();
        let b = store.append(&me, new_record("B", 2.0, 0.0)).await.unwrap();
        store.remove(&me, &a).await.unwrap();

        let records = store.records(&me).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, b);
    }

    #[tokio::test]
    async fn remove_unknown_id_fails() {
        let store = MemoryRecordStore::new();
        let err = store.remove(&Identity::new("u1"), "missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Record not found: missing");
    }

    #[test]
    fn json_round_trip() {
        let mut seed = HashMap::new();
        seed.insert(
            "u1".to_string(),
            vec![SnapshotRecord::from_new("r1", new_record("A Bank", 10.0, 5.0))],
        );
        let store = MemoryRecordStore::with_collections(seed);
        let json = store.to_json().unwrap();

        let back = MemoryRecordStore::from_json(&json).unwrap();
        let records = back.records(&Identity::new("u1")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "r1");
        assert_eq!(records[0].date, Some(d(2024, 1, 5)));
        assert_eq!(records[0].total(), 15.0);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            MemoryRecordStore::from_json("[1, 2"),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        store
            .replace_records(&me, vec![SnapshotRecord::from_new("r1", new_record("A", 1.0, 2.0))])
            .unwrap();
        store.save_to_file(path).unwrap();

        let loaded = MemoryRecordStore::load_from_file(path).unwrap();
        assert_eq!(loaded.records(&me).unwrap(), store.records(&me).unwrap());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            MemoryRecordStore::load_from_file(path.to_str().unwrap()),
            Err(CoreError::FileIO(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// RecordSubscription
// ═══════════════════════════════════════════════════════════════════

mod subscription {
    use super::*;

    #[tokio::test]
    async fn first_event_is_current_collection() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        store.append(&me, new_record("A", 1.0, 0.0)).await.unwrap();

        let mut sub = store.subscribe(&me).await.unwrap();
        let first = sub.next().await.unwrap();
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn subscription_carries_owner_uid() {
        let store = MemoryRecordStore::new();
        let sub = store.subscribe(&Identity::new("u7")).await.unwrap();
        assert_eq!(sub.uid(), "u7");
    }

    #[tokio::test]
    async fn empty_collection_is_still_delivered() {
        let store = MemoryRecordStore::new();
        let mut sub = store.subscribe(&Identity::new("u1")).await.unwrap();
        assert_eq!(sub.next().await, Some(vec![]));
    }

    #[tokio::test]
    async fn each_change_pushes_full_collection() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        let mut sub = store.subscribe(&me).await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        let id = store.append(&me, new_record("A", 1.0, 0.0)).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);

        store.append(&me, new_record("B", 1.0, 0.0)).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 2);

        store.remove(&me, &id).await.unwrap();
        let after = sub.next().await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].institution, "B");
    }

    #[tokio::test]
    async fn coalesced_changes_yield_latest_only() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        let mut sub = store.subscribe(&me).await.unwrap();
        sub.next().await.unwrap();

        for i in 0..3 {
            store.append(&me, new_record(&format!("B{i}"), 1.0, 0.0)).await.unwrap();
        }
        assert_eq!(sub.next().await.unwrap().len(), 3);
        assert_eq!(sub.latest().len(), 3);
    }

    #[tokio::test]
    async fn no_event_without_change() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        let mut sub = store.subscribe(&me).await.unwrap();
        sub.next().await.unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(20), sub.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn failed_remove_pushes_nothing() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        let mut sub = store.subscribe(&me).await.unwrap();
        sub.next().await.unwrap();

        assert!(store.remove(&me, "missing").await.is_err());
        let waited = tokio::time::timeout(Duration::from_millis(20), sub.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn replace_records_notifies_subscribers() {
        let store = MemoryRecordStore::new();
        let me = Identity::new("u1");
        let mut sub = store.subscribe(&me).await.unwrap();
        sub.next().await.unwrap();

        store
            .replace_records(&me, vec![SnapshotRecord::from_new("x", new_record("A", 1.0, 1.0))])
            .unwrap();
        let pushed = sub.next().await.unwrap();
        assert_eq!(pushed[0].id, "x");
    }

    #[tokio::test]
    async fn store_drop_ends_subscription() {
        let store = MemoryRecordStore::new();
        let mut sub = store.subscribe(&Identity::new("u1")).await.unwrap();
        sub.next().await.unwrap();
        drop(store);
        assert_eq!(sub.next().await, None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// StaticIdentityProvider
// ═══════════════════════════════════════════════════════════════════

mod static_identity {
    use super::*;

    #[tokio::test]
    async fn starts_signed_out() {
        let provider = StaticIdentityProvider::new(Identity::new("u1"));
        assert!(provider.current_identity().is_none());
        let me = provider.sign_in().await.unwrap();
        assert_eq!(me.uid, "u1");
        assert_eq!(provider.current_identity(), Some(me));
    }

    #[tokio::test]
    async fn sign_out_clears_identity() {
        let provider = StaticIdentityProvider::signed_in(Identity::new("u1"));
        assert!(provider.current_identity().is_some());
        provider.sign_out().await.unwrap();
        assert!(provider.current_identity().is_none());
        // Signing out twice is harmless.
        provider.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn watchers_see_transitions() {
        let provider = StaticIdentityProvider::new(Identity::new("u1"));
        let mut rx = provider.watch();
        assert!(rx.borrow_and_update().is_none());

        provider.sign_in().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().map(|i| i.uid.as_str()), Some("u1"));

        provider.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// GeminiSummarizer
// ═══════════════════════════════════════════════════════════════════

mod gemini {
    use super::*;

    #[test]
    fn name_and_model() {
        let g = GeminiSummarizer::new("key".into());
        assert_eq!(g.name(), "Gemini");
        assert_eq!(g.model(), "gemini-2.0-flash");
        let custom = GeminiSummarizer::with_model("key".into(), "gemini-1.5-pro");
        assert_eq!(custom.model(), "gemini-1.5-pro");
    }

    #[test]
    fn built_from_configured_keys() {
        let mut keys = HashMap::new();
        assert!(GeminiSummarizer::from_api_keys(&keys).is_none());
        keys.insert("gemini".to_string(), "   ".to_string());
        assert!(GeminiSummarizer::from_api_keys(&keys).is_none());
        keys.insert("gemini".to_string(), "k-123".to_string());
        assert!(GeminiSummarizer::from_api_keys(&keys).is_some());
    }

    #[test]
    fn prompt_lists_days_in_order() {
        let days = vec![
            AggregatedDay::new(d(2024, 1, 5), 1000.0, 500.0),
            AggregatedDay::new(d(2024, 2, 10), 2000.4, 0.0),
        ];
        let prompt = GeminiSummarizer::build_prompt(&days);
        let first = prompt.find("2024-01-05: bank 1000, brokerage 500, total 1500").unwrap();
        let second = prompt.find("2024-02-10: bank 2000, brokerage 0, total 2000").unwrap();
        assert!(first < second);
    }

    #[test]
    fn prompt_without_days_has_only_intro() {
        let prompt = GeminiSummarizer::build_prompt(&[]);
        assert!(!prompt.is_empty());
        assert!(!prompt.contains("bank 0"));
    }

    #[test]
    fn extract_joins_parts_and_trims() {
        let text = GeminiSummarizer::extract_text(text_response(&["  Net worth ", "grew. "])).unwrap();
        assert_eq!(text, "Net worth grew.");
    }

    #[test]
    fn extract_rejects_empty_response() {
        let err = GeminiSummarizer::extract_text(GenerateResponse { candidates: vec![] }).unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "Gemini"));

        let blank = GeminiSummarizer::extract_text(text_response(&["   "]));
        assert!(blank.is_err());
    }

    #[test]
    fn response_parses_from_api_json() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "Steady growth." } ], "role": "model" },
                  "finishReason": "STOP" }
            ],
            "usageMetadata": { "totalTokenCount": 42 }
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(GeminiSummarizer::extract_text(parsed).unwrap(), "Steady growth.");
    }
}
