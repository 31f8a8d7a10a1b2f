use chrono::NaiveDate;
use std::collections::HashMap;

use log::debug;

use crate::models::chart::{AggregatedDay, DailySeries};
use crate::models::record::SnapshotRecord;

/// Running sums for one calendar day.
struct DayTotals {
    date: NaiveDate,
    bank: f64,
    stock: f64,
}

/// Generates chart-ready series from snapshot records.
///
/// The core computes all the numbers; the frontend only renders.
/// Several records may share a day (one per institution), so every day's
/// bank and brokerage amounts are summed into a single point.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Group records by calendar day and sum them, one point per distinct day.
    ///
    /// 1. Key every record by its `YYYY-MM-DD` date key (epoch when missing)
    /// 2. Accumulate bank / brokerage per key in a single pass
    /// 3. Emit points sorted by the underlying date, not the text key
    ///
    /// Expects the ascending sequence but does not rely on it for the output
    /// order. Empty input yields an empty series.
    pub fn aggregate_daily(&self, records: &[SnapshotRecord]) -> DailySeries {
        let mut by_day: HashMap<String, DayTotals> = HashMap::new();

        for record in records {
            let totals = by_day.entry(record.date_key()).or_insert_with(|| DayTotals {
                date: record.effective_date(),
                bank: 0.0,
                stock: 0.0,
            });
            totals.bank += record.bank;
            totals.stock += record.stock;
        }

        let mut points: Vec<AggregatedDay> = by_day
            .into_values()
            .map(|t| AggregatedDay::new(t.date, t.bank, t.stock))
            .collect();
        points.sort_by_key(|p| p.date);

        debug!(
            "Aggregated {} record(s) into {} day(s)",
            records.len(),
            points.len()
        );

        DailySeries::from_sorted(points)
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
