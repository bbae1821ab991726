//! Simulated campaign cost.
//!
//! campaign_cost = round2(reach / 1000 × rate[platform] × (1 + u)),
//! u ~ Uniform[-bound, +bound], one draw per row in input order.

use crate::{
    config::{validate_bound, validate_rates},
    error::{MetricError, MetricResult},
    record::{CampaignRecord, CostedRecord},
    rng::CostRng,
    types::round2,
};
use std::collections::BTreeMap;

/// Attach a simulated `campaign_cost` to every record.
///
/// The generator lives only for the duration of this call, so the same
/// seed and the same input order always reproduce the same costs.
/// Fails on the first record whose platform has no rate.
pub fn derive_costs(
    records: &[CampaignRecord],
    platform_rates: &BTreeMap<String, f64>,
    randomness_bound: f64,
    seed: u64,
) -> MetricResult<Vec<CostedRecord>> {
    validate_bound(randomness_bound)?;
    validate_rates(platform_rates)?;

    let mut rng = CostRng::new(seed);
    let mut out = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        let rate = platform_rates.get(&record.platform).copied().ok_or_else(|| {
            MetricError::UnknownPlatform {
                row,
                platform: record.platform.clone(),
            }
        })?;
        let u = rng.symmetric(randomness_bound);
        out.push(CostedRecord {
            record: record.clone(),
            campaign_cost: simulated_cost(record.estimated_reach, rate, u),
        });
    }

    log::debug!(
        "derive_costs: {} rows costed (seed={seed}, bound=±{randomness_bound})",
        out.len()
    );
    Ok(out)
}

fn simulated_cost(reach: i64, rate: f64, u: f64) -> f64 {
    round2((reach as f64 / 1000.0) * rate * (1.0 + u))
}
