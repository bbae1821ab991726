//! Pre-derivation cleaning.
//!
//! Removes exact duplicate rows and reports negative counts.
//! Records are never modified here; invalid values are left for
//! derive_ratios to reject.

use crate::{record::CampaignRecord, types::RowIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const NUMERIC_COLUMNS: [&str; 4] = [
    "engagements",
    "estimated_reach",
    "product_sales",
    "campaign_duration_days",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanReport {
    pub records: Vec<CampaignRecord>,
    /// Input index of each kept record, parallel to `records`.
    pub source_rows: Vec<RowIndex>,
    pub rows_in: usize,
    pub duplicates_removed: usize,
    /// Column name → number of negative values. Zero counts included.
    pub negative_counts: BTreeMap<String, usize>,
}

impl CleanReport {
    pub fn has_negative_values(&self) -> bool {
        self.negative_counts.values().any(|&n| n > 0)
    }
}

/// Drop exact duplicates (first occurrence wins, order preserved) and
/// count negative values per numeric column.
pub fn clean(records: &[CampaignRecord]) -> CleanReport {
    let mut seen: HashSet<&CampaignRecord> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut source_rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if seen.insert(record) {
            kept.push(record.clone());
            source_rows.push(i);
        }
    }
    let duplicates_removed = records.len() - kept.len();
    if duplicates_removed > 0 {
        log::warn!("clean: removed {duplicates_removed} duplicate rows");
    }

    let mut negative_counts = BTreeMap::new();
    for column in NUMERIC_COLUMNS {
        let n = kept.iter().filter(|r| numeric_value(r, column) < 0).count();
        if n > 0 {
            log::warn!("clean: {column}: {n} negative values found");
        }
        negative_counts.insert(column.to_string(), n);
    }

    CleanReport {
        rows_in: records.len(),
        records: kept,
        source_rows,
        duplicates_removed,
        negative_counts,
    }
}

fn numeric_value(r: &CampaignRecord, column: &str) -> i64 {
    match column {
        "engagements" => r.engagements,
        "estimated_reach" => r.estimated_reach,
        "product_sales" => r.product_sales,
        "campaign_duration_days" => r.campaign_duration_days,
        _ => 0,
    }
}
