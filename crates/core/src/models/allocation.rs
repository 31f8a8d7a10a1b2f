use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::SnapshotRecord;

/// Display colors for the asset-class split (bank, then brokerage).
pub const ASSET_CLASS_COLORS: [&str; 2] = ["#3b82f6", "#10b981"];

/// Palette cycled through by rank for the institution split.
pub const INSTITUTION_COLORS: [&str; 8] = [
    "#0ea5e9", "#6366f1", "#8b5cf6", "#d946ef", "#f43f5e", "#f97316", "#eab308", "#84cc16",
];

/// Which breakdown the allocation chart shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllocationView {
    /// Bank deposits vs. brokerage
    #[default]
    AssetClass,
    /// One slice per institution name
    Institution,
}

impl AllocationView {
    /// The other view (for a two-way toggle).
    pub fn toggled(self) -> Self {
        match self {
            AllocationView::AssetClass => AllocationView::Institution,
            AllocationView::Institution => AllocationView::AssetClass,
        }
    }
}

impl std::fmt::Display for AllocationView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationView::AssetClass => write!(f, "Asset class"),
            AllocationView::Institution => write!(f, "Institution"),
        }
    }
}

/// Totals of the most recent aggregated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTotals {
    /// The day these totals are for; `None` when there is no data
    pub date: Option<NaiveDate>,

    pub bank: f64,

    pub stock: f64,

    pub total: f64,

    /// Every record entered for that day (typically one per institution)
    pub records: Vec<SnapshotRecord>,
}

impl CurrentTotals {
    /// Zero-valued totals with no contributing records.
    pub fn empty() -> Self {
        Self {
            date: None,
            bank: 0.0,
            stock: 0.0,
            total: 0.0,
            records: Vec::new(),
        }
    }
}

impl Default for CurrentTotals {
    fn default() -> Self {
        Self::empty()
    }
}

/// One slice of an allocation breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// Category label (asset class or institution name)
    pub label: String,

    /// Absolute value of this slice
    pub value: f64,

    /// Share of the grand total, 0–100
    pub percentage: f64,

    /// Hex display color
    pub color: String,
}

impl AllocationEntry {
    /// Percentage rounded to one decimal place, e.g. `"66.7%"`.
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}
