//! Slicing and trend views over derived records.
//!
//! These feed the report and the interactive query loop. All of them
//! are pure functions of their input.

use crate::record::DerivedRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Filtering ────────────────────────────────────────────────────────────────

/// Conjunctive record filter. `None` or an empty list matches everything.
/// Date bounds are inclusive and apply to `start_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignFilter {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub campaign_types: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CampaignFilter {
    pub fn matches(&self, row: &DerivedRecord) -> bool {
        let r = &row.record;
        self.start.map_or(true, |s| r.start_date >= s)
            && self.end.map_or(true, |e| r.start_date <= e)
            && member(&self.platforms, &r.platform)
            && member(&self.campaign_types, &r.campaign_type)
            && member(&self.categories, &r.influencer_category)
    }

    pub fn apply(&self, rows: &[DerivedRecord]) -> Vec<DerivedRecord> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

fn member(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

// ── Monthly trends ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGroupPoint {
    pub year: i32,
    pub month: u32,
    pub group: String,
    pub value: f64,
}

/// Summed revenue per calendar month of `start_date`, chronological.
pub fn monthly_revenue(rows: &[DerivedRecord]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for row in rows {
        *months.entry((row.year, row.month)).or_default() += row.revenue;
    }
    months
        .into_iter()
        .map(|((year, month), value)| MonthlyPoint { year, month, value })
        .collect()
}

/// Mean CAC per month and platform, chronological then by platform.
pub fn monthly_cac_by_platform(rows: &[DerivedRecord]) -> Vec<MonthlyGroupPoint> {
    let mut cells: BTreeMap<(i32, u32, &str), (f64, u64)> = BTreeMap::new();
    for row in rows {
        let cell = cells
            .entry((row.year, row.month, row.record.platform.as_str()))
            .or_default();
        cell.0 += row.cac;
        cell.1 += 1;
    }
    cells
        .into_iter()
        .map(|((year, month, group), (sum, n))| MonthlyGroupPoint {
            year,
            month,
            group: group.to_string(),
            value: sum / n as f64,
        })
        .collect()
}

// ── ROAS pivot ───────────────────────────────────────────────────────────────

/// Mean ROAS by platform (rows) × campaign type (columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoasPivot {
    pub platforms: Vec<String>,
    pub campaign_types: Vec<String>,
    /// `cells[i][j]` is platform i × campaign type j; None when empty.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl RoasPivot {
    pub fn get(&self, platform: &str, campaign_type: &str) -> Option<f64> {
        let i = self.platforms.iter().position(|p| p == platform)?;
        let j = self.campaign_types.iter().position(|c| c == campaign_type)?;
        self.cells[i][j]
    }
}

pub fn roas_pivot(rows: &[DerivedRecord]) -> RoasPivot {
    let platforms: BTreeSet<&str> = rows.iter().map(|r| r.record.platform.as_str()).collect();
    let types: BTreeSet<&str> = rows.iter().map(|r| r.record.campaign_type.as_str()).collect();

    let mut sums: BTreeMap<(&str, &str), (f64, u64)> = BTreeMap::new();
    for row in rows {
        let cell = sums
            .entry((row.record.platform.as_str(), row.record.campaign_type.as_str()))
            .or_default();
        cell.0 += row.roas;
        cell.1 += 1;
    }

    let cells: Vec<Vec<Option<f64>>> = platforms
        .iter()
        .map(|p| {
            types
                .iter()
                .map(|t| sums.get(&(*p, *t)).map(|(sum, n)| sum / *n as f64))
                .collect::<Vec<_>>()
        })
        .collect();

    RoasPivot {
        platforms: platforms.into_iter().map(String::from).collect(),
        campaign_types: types.into_iter().map(String::from).collect(),
        cells,
    }
}
