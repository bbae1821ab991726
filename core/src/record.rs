//! Row types flowing through the pipeline.
//!
//! Each stage wraps the previous stage's row and adds columns.
//! No stage ever rewrites a column it did not create.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the input table. Read-only once loaded.
///
/// Counts are signed so the cleaner and the deriver can report
/// negative or zero values instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub platform: String,
    pub campaign_type: String,
    pub influencer_category: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub engagements: i64,
    pub estimated_reach: i64,
    pub product_sales: i64,
    pub campaign_duration_days: i64,
}

/// A campaign record with its simulated cost attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostedRecord {
    #[serde(flatten)]
    pub record: CampaignRecord,
    pub campaign_cost: f64,
}

/// A costed record plus every ratio and calendar column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub record: CampaignRecord,
    pub campaign_cost: f64,
    pub revenue: f64,
    pub roas: f64,
    pub cac: f64,
    pub engagement_rate: f64,
    pub conversion_rate: f64,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub day_of_week: String,
}

impl DerivedRecord {
    /// The base columns this row was derived from.
    pub fn costed(&self) -> CostedRecord {
        CostedRecord {
            record: self.record.clone(),
            campaign_cost: self.campaign_cost,
        }
    }
}
