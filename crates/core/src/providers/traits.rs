use async_trait::async_trait;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::chart::AggregatedDay;
use crate::models::identity::Identity;
use crate::models::record::{NewRecord, SnapshotRecord};

/// The remote document store holding each identity's snapshot records.
///
/// The store pushes the *whole* collection on every change; consumers replace
/// their working copy wholesale and never assume any ordering from it.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RecordStore: Send + Sync {
    /// Human-readable name of this store (for logs/errors).
    fn name(&self) -> &str;

    /// Start listening to the identity's record collection.
    async fn subscribe(&self, identity: &Identity) -> Result<RecordSubscription, CoreError>;

    /// Store a new record; returns the identifier the store assigned.
    async fn append(&self, identity: &Identity, record: NewRecord) -> Result<String, CoreError>;

    /// Delete a record by identifier.
    async fn remove(&self, identity: &Identity, id: &str) -> Result<(), CoreError>;
}

/// Who is signed in. Only presence/absence and the uid matter to the core.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;

    /// Change notifications: receives `Some` on sign-in, `None` on sign-out.
    fn watch(&self) -> watch::Receiver<Option<Identity>>;

    async fn sign_in(&self) -> Result<Identity, CoreError>;

    async fn sign_out(&self) -> Result<(), CoreError>;
}

/// Optional text generation over recent aggregated days. Purely decorative.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, days: &[AggregatedDay]) -> Result<String, CoreError>;
}

/// Live view of one identity's record collection.
///
/// Each event is the full collection. If several changes land between two
/// reads only the latest is observed (last write wins). Dropping the
/// subscription cancels it.
#[derive(Debug)]
pub struct RecordSubscription {
    uid: String,
    receiver: watch::Receiver<Vec<SnapshotRecord>>,
    delivered_initial: bool,
}

impl RecordSubscription {
    pub fn new(uid: impl Into<String>, receiver: watch::Receiver<Vec<SnapshotRecord>>) -> Self {
        Self {
            uid: uid.into(),
            receiver,
            delivered_initial: false,
        }
    }

    /// Uid of the identity whose collection this subscription follows.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Wait for the next full collection.
    ///
    /// The first call returns the collection as it was when subscribing.
    /// Returns `None` once the store has shut the collection down.
    pub async fn next(&mut self) -> Option<Vec<SnapshotRecord>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(self.receiver.borrow_and_update().clone());
        }
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// The most recent collection, without waiting.
    pub fn latest(&self) -> Vec<SnapshotRecord> {
        self.receiver.borrow().clone()
    }
}
