use crate::models::allocation::CurrentTotals;
use crate::models::chart::DailySeries;
use crate::models::record::SnapshotRecord;

/// Picks the "current totals": the most recent aggregated day and the raw
/// records that make it up.
pub struct SnapshotService;

impl SnapshotService {
    pub fn new() -> Self {
        Self
    }

    /// Most recent day of `series`, or zero totals when there is no data.
    ///
    /// `records` should be the ascending sequence; contributing records are
    /// returned in that order.
    pub fn current_totals(&self, series: &DailySeries, records: &[SnapshotRecord]) -> CurrentTotals {
        let Some(latest) = series.latest() else {
            return CurrentTotals::empty();
        };

        let key = latest.date_key();
        let contributing = records
            .iter()
            .filter(|r| r.date_key() == key)
            .cloned()
            .collect();

        CurrentTotals {
            date: Some(latest.date),
            bank: latest.bank,
            stock: latest.stock,
            total: latest.total,
            records: contributing,
        }
    }
}

impl Default for SnapshotService {
    fn default() -> Self {
        Self::new()
    }
}
