//! Efficiency-weighted budget reallocation.
//!
//! weight[g] = score[g] / Σ score
//! recommended[g] = weight[g] × Σ current spend

use crate::{
    error::{MetricError, MetricResult},
    rollup::GroupRollup,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub group: String,
    pub efficiency_score: f64,
    pub current_budget: f64,
    pub weight: f64,
    pub recommended_budget: f64,
    /// Recommended share minus current share, in percentage points.
    pub change_pct: f64,
}

impl Allocation {
    pub fn current_share_pct(&self, total_budget: f64) -> f64 {
        if total_budget > 0.0 {
            self.current_budget / total_budget * 100.0
        } else {
            0.0
        }
    }

    pub fn recommended_share_pct(&self) -> f64 {
        self.weight * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reallocation {
    pub total_budget: f64,
    /// Same order as the rollup it was computed from.
    pub allocations: Vec<Allocation>,
}

impl Reallocation {
    pub fn budget_for(&self, group: &str) -> Option<f64> {
        self.allocations
            .iter()
            .find(|a| a.group == group)
            .map(|a| a.recommended_budget)
    }

    pub fn weight_for(&self, group: &str) -> Option<f64> {
        self.allocations
            .iter()
            .find(|a| a.group == group)
            .map(|a| a.weight)
    }

    pub fn weight_sum(&self) -> f64 {
        self.allocations.iter().map(|a| a.weight).sum()
    }

    pub fn as_map(&self) -> BTreeMap<String, f64> {
        self.allocations
            .iter()
            .map(|a| (a.group.clone(), a.recommended_budget))
            .collect()
    }
}

/// Redistribute the current total spend in proportion to efficiency.
///
/// A negative or non-finite score is an invariant violation, not a
/// recoverable condition. An empty rollup has a zero score sum.
pub fn compute_reallocation(rollup: &[GroupRollup]) -> MetricResult<Reallocation> {
    for r in rollup {
        if !r.efficiency_score.is_finite() || r.efficiency_score < 0.0 {
            return Err(MetricError::DegenerateEfficiency {
                group: r.group.clone(),
                reason: format!(
                    "efficiency score {} is not a non-negative number",
                    r.efficiency_score
                ),
            });
        }
    }

    let score_sum: f64 = rollup.iter().map(|r| r.efficiency_score).sum();
    if score_sum == 0.0 {
        return Err(MetricError::DegenerateEfficiency {
            group: "*".into(),
            reason: "sum of efficiency scores is zero".into(),
        });
    }

    let total_budget: f64 = rollup.iter().map(|r| r.campaign_cost).sum();
    let allocations = rollup
        .iter()
        .map(|r| {
            let weight = r.efficiency_score / score_sum;
            let current_share = if total_budget > 0.0 {
                r.campaign_cost / total_budget
            } else {
                0.0
            };
            Allocation {
                group: r.group.clone(),
                efficiency_score: r.efficiency_score,
                current_budget: r.campaign_cost,
                weight,
                recommended_budget: weight * total_budget,
                change_pct: (weight - current_share) * 100.0,
            }
        })
        .collect();

    Ok(Reallocation {
        total_budget,
        allocations,
    })
}
