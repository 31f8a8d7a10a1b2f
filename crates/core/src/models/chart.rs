use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::DATE_KEY_FORMAT;

/// One point of the trend chart: every record sharing a calendar day, summed.
///
/// Generated here, rendered as-is by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDay {
    /// The calendar day this point covers
    pub date: NaiveDate,

    /// Sum of bank amounts recorded on this day
    pub bank: f64,

    /// Sum of brokerage amounts recorded on this day
    pub stock: f64,

    /// bank + stock
    pub total: f64,
}

impl AggregatedDay {
    pub fn new(date: NaiveDate, bank: f64, stock: f64) -> Self {
        Self {
            date,
            bank,
            stock,
            total: bank + stock,
        }
    }

    /// `YYYY-MM-DD` key, identical to [`SnapshotRecord::date_key`](super::record::SnapshotRecord::date_key).
    pub fn date_key(&self) -> String {
        self.date.format(DATE_KEY_FORMAT).to_string()
    }

    /// Axis tick label (`YYYY-MM`).
    pub fn axis_label(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// Ascending-by-date series of [`AggregatedDay`] points.
///
/// Owns its points, so it can be iterated any number of times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    points: Vec<AggregatedDay>,
}

impl DailySeries {
    /// Build a series from points already sorted ascending by date.
    pub(crate) fn from_sorted(points: Vec<AggregatedDay>) -> Self {
        Self { points }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedDay> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[AggregatedDay] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent day, if any.
    pub fn latest(&self) -> Option<&AggregatedDay> {
        self.points.last()
    }

    /// The last `n` days (or fewer when the series is shorter).
    pub fn recent(&self, n: usize) -> &[AggregatedDay] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = &'a AggregatedDay;
    type IntoIter = std::slice::Iter<'a, AggregatedDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
