use std::cmp::Ordering;

use log::warn;

use crate::models::record::SnapshotRecord;

/// Orders snapshot records for the chart (oldest first) and the history table
/// (newest first).
///
/// Pure business logic: always sorts a copy, the input slice is never touched.
pub struct SequenceService;

impl SequenceService {
    pub fn new() -> Self {
        Self
    }

    /// Chart order: snapshot date ascending, then creation time ascending.
    ///
    /// Missing dates/timestamps sort as the epoch, so malformed records end up
    /// at the front instead of failing the whole sort. Records with identical
    /// keys keep their input order (stable sort).
    pub fn ascending(&self, records: &[SnapshotRecord]) -> Vec<SnapshotRecord> {
        Self::warn_degraded(records);
        let mut sorted = records.to_vec();
        sorted.sort_by(Self::cmp_ascending);
        sorted
    }

    /// Table order: snapshot date descending, then creation time descending,
    /// then identifier descending (as text) so the order is fully deterministic.
    pub fn descending(&self, records: &[SnapshotRecord]) -> Vec<SnapshotRecord> {
        let mut sorted = records.to_vec();
        sorted.sort_by(Self::cmp_descending);
        sorted
    }

    fn cmp_ascending(a: &SnapshotRecord, b: &SnapshotRecord) -> Ordering {
        a.effective_date()
            .cmp(&b.effective_date())
            .then_with(|| a.effective_created_at().cmp(&b.effective_created_at()))
    }

    fn cmp_descending(a: &SnapshotRecord, b: &SnapshotRecord) -> Ordering {
        b.effective_date()
            .cmp(&a.effective_date())
            .then_with(|| b.effective_created_at().cmp(&a.effective_created_at()))
            .then_with(|| b.id.cmp(&a.id))
    }

    fn warn_degraded(records: &[SnapshotRecord]) {
        let degraded = records.iter().filter(|r| r.is_degraded()).count();
        if degraded > 0 {
            warn!("{degraded} record(s) missing a date or creation time; sorting them as the epoch");
        }
    }
}

impl Default for SequenceService {
    fn default() -> Self {
        Self::new()
    }
}
