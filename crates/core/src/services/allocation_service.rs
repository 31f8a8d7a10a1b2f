use std::collections::HashMap;

use crate::models::allocation::{
    AllocationEntry, AllocationView, CurrentTotals, ASSET_CLASS_COLORS, INSTITUTION_COLORS,
};
use crate::models::settings::Settings;

/// Computes allocation breakdowns (pie-chart slices) of the current totals.
///
/// Both breakdowns are empty when the grand total is zero, so no percentage
/// is ever computed against a zero denominator.
pub struct AllocationService {
    bank_label: String,
    brokerage_label: String,
    uncategorized_label: String,
}

impl AllocationService {
    pub fn new(settings: &Settings) -> Self {
        Self {
            bank_label: settings.bank_label.clone(),
            brokerage_label: settings.brokerage_label.clone(),
            uncategorized_label: settings.uncategorized_label.clone(),
        }
    }

    /// Breakdown for the selected view.
    pub fn compose(&self, totals: &CurrentTotals, view: AllocationView) -> Vec<AllocationEntry> {
        match view {
            AllocationView::AssetClass => self.by_asset_class(totals),
            AllocationView::Institution => self.by_institution(totals),
        }
    }

    /// Bank vs. brokerage, always in that order, zero-valued classes dropped.
    pub fn by_asset_class(&self, totals: &CurrentTotals) -> Vec<AllocationEntry> {
        if totals.total <= 0.0 {
            return Vec::new();
        }

        [
            (&self.bank_label, totals.bank, ASSET_CLASS_COLORS[0]),
            (&self.brokerage_label, totals.stock, ASSET_CLASS_COLORS[1]),
        ]
        .into_iter()
        .filter(|(_, value, _)| *value > 0.0)
        .map(|(label, value, color)| AllocationEntry {
            label: label.clone(),
            value,
            percentage: value / totals.total * 100.0,
            color: color.to_string(),
        })
        .collect()
    }

    /// One slice per institution among the contributing records.
    ///
    /// Blank or whitespace-only names share a single "uncategorized" bucket;
    /// other names are grouped exactly as typed. Slices are sorted by
    /// value, largest first (equal values keep first-seen order), and colored
    /// by rank from the institution palette.
    pub fn by_institution(&self, totals: &CurrentTotals) -> Vec<AllocationEntry> {
        if totals.total <= 0.0 {
            return Vec::new();
        }

        let mut buckets: Vec<(String, f64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in &totals.records {
            let label = if record.institution.trim().is_empty() {
                self.uncategorized_label.as_str()
            } else {
                record.institution.as_str()
            };
            match index.get(label) {
                Some(&i) => buckets[i].1 += record.total(),
                None => {
                    index.insert(label.to_string(), buckets.len());
                    buckets.push((label.to_string(), record.total()));
                }
            }
        }

        buckets.retain(|(_, value)| *value > 0.0);
        buckets.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        buckets
            .into_iter()
            .enumerate()
            .map(|(rank, (label, value))| AllocationEntry {
                label,
                value,
                percentage: value / totals.total * 100.0,
                color: INSTITUTION_COLORS[rank % INSTITUTION_COLORS.len()].to_string(),
            })
            .collect()
    }
}

impl Default for AllocationService {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
