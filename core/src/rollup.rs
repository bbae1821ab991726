//! Group-by rollups over derived records.
//!
//! Rollups are recomputed in full on every call. There is no cached
//! or incremental rollup state.

use crate::{
    error::{MetricError, MetricResult},
    record::DerivedRecord,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Column a rollup groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    #[default]
    Platform,
    CampaignType,
    InfluencerCategory,
}

impl GroupKey {
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::CampaignType => "campaign_type",
            Self::InfluencerCategory => "influencer_category",
        }
    }

    pub fn value_of<'a>(&self, row: &'a DerivedRecord) -> &'a str {
        match self {
            Self::Platform => &row.record.platform,
            Self::CampaignType => &row.record.campaign_type,
            Self::InfluencerCategory => &row.record.influencer_category,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for GroupKey {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "platform" => Ok(Self::Platform),
            "campaign_type" => Ok(Self::CampaignType),
            "influencer_category" | "category" => Ok(Self::InfluencerCategory),
            other => Err(MetricError::InvalidConfig(format!(
                "unknown group key '{other}'"
            ))),
        }
    }
}

/// One row per distinct group value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRollup {
    pub group: String,
    pub total_campaigns: u64,
    // Sums
    pub campaign_cost: f64,
    pub revenue: f64,
    pub product_sales: i64,
    // Means
    pub roas: f64,
    pub cac: f64,
    pub engagement_rate: f64,
    pub conversion_rate: f64,
    /// mean(ROAS) / mean(CAC).
    pub efficiency_score: f64,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    campaign_cost: f64,
    revenue: f64,
    product_sales: i64,
    roas: f64,
    cac: f64,
    engagement_rate: f64,
    conversion_rate: f64,
}

impl Accumulator {
    fn add(&mut self, group: &str, row: &DerivedRecord) -> MetricResult<()> {
        self.product_sales = self
            .product_sales
            .checked_add(row.record.product_sales)
            .ok_or_else(|| MetricError::SumOverflow {
                group: group.to_string(),
                column: "product_sales",
            })?;
        self.count += 1;
        self.campaign_cost += row.campaign_cost;
        self.revenue += row.revenue;
        self.roas += row.roas;
        self.cac += row.cac;
        self.engagement_rate += row.engagement_rate;
        self.conversion_rate += row.conversion_rate;
        Ok(())
    }

    fn finish(self, group: String) -> MetricResult<GroupRollup> {
        let n = self.count as f64;
        let roas = self.roas / n;
        let cac = self.cac / n;
        if cac == 0.0 {
            return Err(MetricError::DegenerateEfficiency {
                group,
                reason: "mean CAC is zero".into(),
            });
        }
        Ok(GroupRollup {
            total_campaigns: self.count,
            campaign_cost: self.campaign_cost,
            revenue: self.revenue,
            product_sales: self.product_sales,
            roas,
            cac,
            engagement_rate: self.engagement_rate / n,
            conversion_rate: self.conversion_rate / n,
            efficiency_score: roas / cac,
            group,
        })
    }
}

/// Roll derived records up by `key`.
///
/// Emission order: descending summed revenue, ties by ascending key.
/// Fails with DegenerateEfficiency on the first group (in key order)
/// whose mean CAC is exactly zero, or with SumOverflow when a group's
/// product_sales total does not fit in an i64.
pub fn compute_rollup(derived: &[DerivedRecord], key: GroupKey) -> MetricResult<Vec<GroupRollup>> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for row in derived {
        let group = key.value_of(row);
        groups.entry(group).or_default().add(group, row)?;
    }

    let mut rollup = groups
        .into_iter()
        .map(|(group, acc)| acc.finish(group.to_string()))
        .collect::<MetricResult<Vec<_>>>()?;

    rollup.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.group.cmp(&b.group))
    });

    for r in &rollup {
        log::debug!(
            "rollup[{key}] {}: campaigns={} cost={:.2} revenue={:.2} efficiency={:.4}",
            r.group,
            r.total_campaigns,
            r.campaign_cost,
            r.revenue,
            r.efficiency_score
        );
    }
    Ok(rollup)
}
