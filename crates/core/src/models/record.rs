use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Canonical, locale-independent date key used for grouping (`YYYY-MM-DD`).
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Stand-in date for records whose snapshot date is missing.
pub fn epoch_date() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

/// One user-entered reading of bank and brokerage balances.
///
/// Records come from the external store as-is. `date` and `created_at` are
/// optional because a malformed document must not break the derived views:
/// wherever an ordering or grouping key is needed, a missing value is
/// replaced by the Unix epoch (see [`SnapshotRecord::effective_date`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Opaque identifier assigned by the store
    pub id: String,

    /// Calendar date chosen by the user (no time-of-day significance)
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Server-assigned creation instant, only used for tie-breaking
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Bank / broker label. Empty means "uncategorized".
    #[serde(default)]
    pub institution: String,

    /// Bank deposit amount (non-negative)
    pub bank: f64,

    /// Brokerage amount (non-negative)
    pub stock: f64,

    #[serde(default)]
    pub note: Option<String>,
}

impl SnapshotRecord {
    /// Build a stored record from a validated submission and its store-assigned id.
    pub fn from_new(id: impl Into<String>, record: NewRecord) -> Self {
        Self {
            id: id.into(),
            date: Some(record.date),
            created_at: Some(record.created_at),
            institution: record.institution,
            bank: record.bank,
            stock: record.stock,
            note: record.note,
        }
    }

    /// Snapshot date, or the epoch when missing.
    pub fn effective_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(epoch_date)
    }

    /// Creation instant, or the epoch when missing.
    pub fn effective_created_at(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// `YYYY-MM-DD` grouping key of the effective date.
    pub fn date_key(&self) -> String {
        self.effective_date().format(DATE_KEY_FORMAT).to_string()
    }

    /// Combined bank + brokerage value.
    pub fn total(&self) -> f64 {
        self.bank + self.stock
    }

    /// True when the record is missing a field the sequencer relies on.
    pub fn is_degraded(&self) -> bool {
        self.date.is_none() || self.created_at.is_none()
    }
}

/// A validated record that has not been assigned an identifier yet.
/// This is what gets appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub institution: String,
    pub bank: f64,
    pub stock: f64,
    pub note: Option<String>,
}

/// The raw entry form. Amounts are `None` when the field was left empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordDraft {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub institution: String,
    pub bank: Option<f64>,
    pub stock: Option<f64>,
    #[serde(default)]
    pub note: String,
}

impl RecordDraft {
    pub fn new(date: NaiveDate, institution: impl Into<String>, bank: f64, stock: f64) -> Self {
        Self {
            date: Some(date),
            institution: institution.into(),
            bank: Some(bank),
            stock: Some(stock),
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Check the form and turn it into a [`NewRecord`] stamped with `now`.
    ///
    /// Rules:
    /// - Both amounts are required (an empty field is an error, zero is fine)
    /// - Amounts must be finite and non-negative
    /// - A missing date defaults to the day of `now`
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewRecord, CoreError> {
        let (bank, stock) = match (self.bank, self.stock) {
            (Some(bank), Some(stock)) => (bank, stock),
            _ => {
                return Err(CoreError::ValidationError(
                    "Both bank and brokerage amounts are required".into(),
                ))
            }
        };

        for (label, value) in [("Bank", bank), ("Brokerage", stock)] {
            if !value.is_finite() {
                return Err(CoreError::ValidationError(format!(
                    "{label} amount must be a finite number"
                )));
            }
            if value < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "{label} amount must not be negative (got {value})"
                )));
            }
        }

        let note = self.note.trim();
        Ok(NewRecord {
            date: self.date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
            institution: self.institution.trim().to_string(),
            bank,
            stock,
            note: if note.is_empty() { None } else { Some(note.to_string()) },
        })
    }
}
