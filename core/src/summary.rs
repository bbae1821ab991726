//! Executive summary over one pipeline run.

use crate::{
    error::{MetricError, MetricResult},
    reallocation::Reallocation,
    record::DerivedRecord,
    rollup::GroupRollup,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_campaigns: usize,
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_sales: i64,
    /// Σ revenue / Σ spend; 0 when nothing was spent.
    pub overall_roas: f64,
    /// Mean of per-row CAC; 0 for an empty table.
    pub average_cac: f64,
    pub best_roas_platform: Option<Leader>,
    pub lowest_cac_platform: Option<Leader>,
    pub most_efficient_platform: Option<Leader>,
    pub best_campaign_type: Option<Leader>,
}

impl Summary {
    pub fn compute(
        rows: &[DerivedRecord],
        platforms: &[GroupRollup],
        campaign_types: &[GroupRollup],
    ) -> MetricResult<Self> {
        let total_spend: f64 = rows.iter().map(|r| r.campaign_cost).sum();
        let total_revenue: f64 = rows.iter().map(|r| r.revenue).sum();
        let total_sales = rows
            .iter()
            .try_fold(0i64, |acc, r| acc.checked_add(r.record.product_sales))
            .ok_or_else(|| MetricError::SumOverflow {
                group: "*".into(),
                column: "product_sales",
            })?;
        let overall_roas = if total_spend > 0.0 {
            total_revenue / total_spend
        } else {
            0.0
        };
        let average_cac = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|r| r.cac).sum::<f64>() / rows.len() as f64
        };

        Ok(Self {
            total_campaigns: rows.len(),
            total_spend,
            total_revenue,
            total_sales,
            overall_roas,
            average_cac,
            best_roas_platform: leader(platforms, |r| r.roas, true),
            lowest_cac_platform: leader(platforms, |r| r.cac, false),
            most_efficient_platform: leader(platforms, |r| r.efficiency_score, true),
            best_campaign_type: leader(campaign_types, |r| r.roas, true),
        })
    }
}

/// Pick the best group by `metric`. Ties go to the alphabetically
/// first group so the answer does not depend on rollup order.
fn leader(
    rollup: &[GroupRollup],
    metric: impl Fn(&GroupRollup) -> f64,
    highest: bool,
) -> Option<Leader> {
    rollup
        .iter()
        .min_by(|a, b| {
            let ord = metric(*a).total_cmp(&metric(*b));
            let ord = if highest { ord.reverse() } else { ord };
            ord.then_with(|| a.group.cmp(&b.group))
        })
        .map(|r| Leader {
            name: r.group.clone(),
            value: metric(r),
        })
}

/// Plain-text executive report.
pub fn render_report(summary: &Summary, realloc: &Reallocation) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "INFLUENCER MARKETING - EXECUTIVE SUMMARY");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);
    let _ = writeln!(out, "OVERALL PERFORMANCE:");
    let _ = writeln!(out, "  Total Campaigns:     {}", summary.total_campaigns);
    let _ = writeln!(out, "  Total Budget Spent:  ${:.2}", summary.total_spend);
    let _ = writeln!(out, "  Total Revenue:       ${:.2}", summary.total_revenue);
    let _ = writeln!(out, "  Total Sales:         {}", summary.total_sales);
    let _ = writeln!(out, "  Overall ROAS:        {:.2}", summary.overall_roas);
    let _ = writeln!(out, "  Average CAC:         ${:.2}", summary.average_cac);
    let _ = writeln!(out);
    let _ = writeln!(out, "KEY INSIGHTS:");
    let insights = [
        ("Best ROAS Platform:  ", &summary.best_roas_platform),
        ("Lowest CAC Platform: ", &summary.lowest_cac_platform),
        ("Most Efficient:      ", &summary.most_efficient_platform),
        ("Best Campaign Type:  ", &summary.best_campaign_type),
    ];
    for (label, who) in insights {
        match who {
            Some(l) => {
                let _ = writeln!(out, "  {label}{} ({:.2})", l.name, l.value);
            }
            None => {
                let _ = writeln!(out, "  {label}n/a");
            }
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "BUDGET ALLOCATION RECOMMENDATIONS:");

    let mut by_efficiency: Vec<_> = realloc.allocations.iter().collect();
    by_efficiency.sort_by(|a, b| {
        b.efficiency_score
            .total_cmp(&a.efficiency_score)
            .then_with(|| a.group.cmp(&b.group))
    });
    for a in by_efficiency {
        let _ = writeln!(
            out,
            "  {:12} | Current: {:5.1}% -> Recommended: {:5.1}% ({:+.1}%)",
            a.group,
            a.current_share_pct(realloc.total_budget),
            a.recommended_share_pct(),
            a.change_pct
        );
    }
    let _ = writeln!(out, "{rule}");
    out
}
