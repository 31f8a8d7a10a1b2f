use chrono::{DateTime, Utc};
use log::{error, info};

use crate::errors::CoreError;
use crate::models::identity::Identity;
use crate::models::record::{RecordDraft, SnapshotRecord};
use crate::providers::traits::RecordStore;

/// Validates user input and forwards create/delete requests to the store.
///
/// Mutations are fire-and-forget: the store's next pushed collection is the
/// authoritative view, so nothing here touches local state. Failed mutations
/// are logged and returned; they are never retried automatically.
pub struct RecordService;

impl RecordService {
    pub fn new() -> Self {
        Self
    }

    /// Validate `draft` and append it. Returns the new record's identifier.
    /// Invalid drafts never reach the store.
    pub async fn submit(
        &self,
        store: &dyn RecordStore,
        identity: &Identity,
        draft: &RecordDraft,
        now: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        let record = draft.validate(now)?;
        match store.append(identity, record).await {
            Ok(id) => {
                info!("Record {id} submitted to {}", store.name());
                Ok(id)
            }
            Err(e) => {
                error!("Failed to add record via {}: {e}", store.name());
                Err(e)
            }
        }
    }

    /// Remove a record by identifier.
    pub async fn delete(
        &self,
        store: &dyn RecordStore,
        identity: &Identity,
        id: &str,
    ) -> Result<(), CoreError> {
        if id.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Record identifier must not be empty".into(),
            ));
        }
        store.remove(identity, id).await.inspect_err(|e| {
            error!("Failed to delete record {id} via {}: {e}", store.name());
        })
    }

    /// Distinct non-blank institution names, sorted case-insensitively,
    /// for autocompleting the entry form.
    pub fn suggested_institutions(&self, records: &[SnapshotRecord]) -> Vec<String> {
        let mut names: Vec<String> = records
            .iter()
            .map(|r| r.institution.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
        names.dedup();
        names
    }
}

impl Default for RecordService {
    fn default() -> Self {
        Self::new()
    }
}
