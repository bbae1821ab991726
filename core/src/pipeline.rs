//! The metrics pipeline: one load in, every derived view out.
//!
//! STAGE ORDER (fixed, documented, never reordered):
//!   1. Clean          (duplicates, negative-value report)
//!   2. Costs          (seeded perturbation, input row order)
//!   3. Ratios         (ROAS, CAC, rates, calendar fields)
//!   4. Rollups        (platform, influencer category, campaign type)
//!   5. Reallocation   (platform rollup only)
//!   6. Summary
//!   7. Persist        (run ledger)
//!
//! RULES:
//!   - Each stage adds columns; no stage rewrites an earlier stage's output.
//!   - The first failing stage aborts the run. Nothing is persisted.
//!   - All randomness comes from the configured seed.

use crate::{
    clean::{clean, CleanReport},
    config::MetricsConfig,
    cost::derive_costs,
    error::{MetricError, MetricResult},
    ratios::derive_ratios,
    reallocation::{compute_reallocation, Reallocation},
    record::{CampaignRecord, DerivedRecord},
    rollup::{compute_rollup, GroupKey, GroupRollup},
    store::MetricsStore,
    summary::Summary,
    types::RunId,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub run_id: RunId,
    pub clean: CleanReport,
    pub derived: Vec<DerivedRecord>,
    pub platform_rollup: Vec<GroupRollup>,
    pub category_rollup: Vec<GroupRollup>,
    pub campaign_type_rollup: Vec<GroupRollup>,
    pub reallocation: Reallocation,
    pub summary: Summary,
}

impl PipelineOutput {
    pub fn rollup(&self, key: GroupKey) -> &[GroupRollup] {
        match key {
            GroupKey::Platform => &self.platform_rollup,
            GroupKey::CampaignType => &self.campaign_type_rollup,
            GroupKey::InfluencerCategory => &self.category_rollup,
        }
    }
}

pub struct MetricsPipeline {
    pub config: MetricsConfig,
    store: MetricsStore,
}

impl MetricsPipeline {
    pub fn new(config: MetricsConfig, store: MetricsStore) -> MetricResult<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    /// Pipeline over an in-memory store with test defaults.
    pub fn build_test(seed: u64) -> MetricResult<Self> {
        let store = MetricsStore::in_memory()?;
        store.migrate()?;
        Self::new(MetricsConfig::default_test().with_seed(seed), store)
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    /// Run every stage over `records` and persist the result.
    /// `source` names where the records came from (a path, "stdin", ...).
    pub fn run(&self, records: &[CampaignRecord], source: &str) -> MetricResult<PipelineOutput> {
        let cfg = &self.config;

        let clean = clean(records);
        log::info!(
            "clean: {} rows in, {} kept ({} duplicates)",
            clean.rows_in,
            clean.records.len(),
            clean.duplicates_removed
        );

        // Per-row errors name the caller's row, not the deduplicated one.
        let input_row = |e: MetricError| {
            e.map_row(|i| clean.source_rows.get(i).copied().unwrap_or(i))
        };
        let costed = derive_costs(
            &clean.records,
            &cfg.platform_rates,
            cfg.randomness_bound,
            cfg.seed,
        )
        .map_err(&input_row)?;
        let derived = derive_ratios(&costed, cfg.average_order_value).map_err(&input_row)?;
        log::info!("derive: {} rows with cost and ratio columns", derived.len());

        let platform_rollup = compute_rollup(&derived, GroupKey::Platform)?;
        let category_rollup = compute_rollup(&derived, GroupKey::InfluencerCategory)?;
        let campaign_type_rollup = compute_rollup(&derived, GroupKey::CampaignType)?;
        log::info!(
            "rollup: {} platforms, {} categories, {} campaign types",
            platform_rollup.len(),
            category_rollup.len(),
            campaign_type_rollup.len()
        );

        let reallocation = compute_reallocation(&platform_rollup)?;
        let summary = Summary::compute(&derived, &platform_rollup, &campaign_type_rollup)?;

        let run_id = uuid::Uuid::new_v4().to_string();
        self.persist(
            &run_id,
            source,
            &derived,
            &platform_rollup,
            &category_rollup,
            &campaign_type_rollup,
            &reallocation,
        )?;
        log::info!("run {run_id}: persisted (seed={}, source={source})", cfg.seed);

        Ok(PipelineOutput {
            run_id,
            clean,
            derived,
            platform_rollup,
            category_rollup,
            campaign_type_rollup,
            reallocation,
            summary,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn persist(
        &self,
        run_id: &str,
        source: &str,
        derived: &[DerivedRecord],
        platform: &[GroupRollup],
        category: &[GroupRollup],
        campaign_type: &[GroupRollup],
        reallocation: &Reallocation,
    ) -> MetricResult<()> {
        self.store
            .insert_run(run_id, self.config.seed, env!("CARGO_PKG_VERSION"), source)?;
        self.store.insert_derived(run_id, derived)?;
        self.store.insert_rollup(run_id, GroupKey::Platform, platform)?;
        self.store
            .insert_rollup(run_id, GroupKey::InfluencerCategory, category)?;
        self.store
            .insert_rollup(run_id, GroupKey::CampaignType, campaign_type)?;
        self.store.insert_allocations(run_id, reallocation)?;
        Ok(())
    }
}
