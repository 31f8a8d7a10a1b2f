use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::watch;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::identity::Identity;
use crate::models::record::{NewRecord, SnapshotRecord};
use super::traits::{RecordStore, RecordSubscription};

/// In-process record store.
///
/// Keeps one live collection per identity and pushes the full collection to
/// every subscriber on each change, like the hosted document store does.
/// Useful offline, in tests, and as a local cache that can be exported to
/// JSON or a file.
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<String, watch::Sender<Vec<SnapshotRecord>>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with collections keyed by uid.
    pub fn with_collections(collections: HashMap<String, Vec<SnapshotRecord>>) -> Self {
        let senders = collections
            .into_iter()
            .map(|(uid, records)| (uid, watch::channel(records).0))
            .collect();
        Self {
            collections: RwLock::new(senders),
        }
    }

    /// Current records of one identity (store order, i.e. insertion order).
    pub fn records(&self, identity: &Identity) -> Result<Vec<SnapshotRecord>, CoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| CoreError::store("read", "lock poisoned"))?;
        Ok(collections
            .get(&identity.uid)
            .map(|sender| sender.borrow().clone())
            .unwrap_or_default())
    }

    /// Replace one identity's whole collection (e.g., after an import).
    /// Subscribers receive the new collection.
    pub fn replace_records(
        &self,
        identity: &Identity,
        records: Vec<SnapshotRecord>,
    ) -> Result<(), CoreError> {
        self.with_sender(identity, "replace", |sender| {
            sender.send_replace(records);
        })
    }

    /// Serialize every collection to pretty JSON (`{ uid: [records] }`).
    pub fn to_json(&self) -> Result<String, CoreError> {
        let snapshot = self.snapshot()?;
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize records: {e}")))
    }

    /// Rebuild a store from [`to_json`](Self::to_json) output.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let collections: HashMap<String, Vec<SnapshotRecord>> = serde_json::from_str(json)?;
        Ok(Self::with_collections(collections))
    }

    /// Save all collections to a JSON file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&self, path: &str) -> Result<(), CoreError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a store from a JSON file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn snapshot(&self) -> Result<HashMap<String, Vec<SnapshotRecord>>, CoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| CoreError::store("read", "lock poisoned"))?;
        Ok(collections
            .iter()
            .map(|(uid, sender)| (uid.clone(), sender.borrow().clone()))
            .collect())
    }

    /// Run `f` against the identity's sender, creating an empty collection first if needed.
    fn with_sender<R>(
        &self,
        identity: &Identity,
        operation: &str,
        f: impl FnOnce(&watch::Sender<Vec<SnapshotRecord>>) -> R,
    ) -> Result<R, CoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| CoreError::store(operation, "lock poisoned"))?;
        let sender = collections
            .entry(identity.uid.clone())
            .or_insert_with(|| watch::channel(Vec::new()).0);
        Ok(f(sender))
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "Memory"
    }

    async fn subscribe(&self, identity: &Identity) -> Result<RecordSubscription, CoreError> {
        let receiver = self.with_sender(identity, "subscribe", |sender| sender.subscribe())?;
        debug!("Subscribed to records of {}", identity.uid);
        Ok(RecordSubscription::new(identity.uid.clone(), receiver))
    }

    async fn append(&self, identity: &Identity, record: NewRecord) -> Result<String, CoreError> {
        let id = Uuid::new_v4().to_string();
        let stored = SnapshotRecord::from_new(id.clone(), record);
        self.with_sender(identity, "append", |sender| {
            sender.send_modify(|records| records.push(stored));
        })?;
        info!("Appended record {id} for {}", identity.uid);
        Ok(id)
    }

    async fn remove(&self, identity: &Identity, id: &str) -> Result<(), CoreError> {
        let removed = self.with_sender(identity, "remove", |sender| {
            sender.send_if_modified(|records| {
                let before = records.len();
                records.retain(|r| r.id != id);
                records.len() != before
            })
        })?;
        if !removed {
            return Err(CoreError::RecordNotFound(id.to_string()));
        }
        info!("Removed record {id} for {}", identity.uid);
        Ok(())
    }
}
