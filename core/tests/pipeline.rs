//! End-to-end pipeline tests over the bundled sample dataset.

use campaign_metrics::{
    pipeline::MetricsPipeline, record::CampaignRecord, table, GroupKey, MetricError,
};

const SAMPLE: &str = include_str!("../../data/sample_campaigns.csv");

fn sample() -> Vec<CampaignRecord> {
    table::read_campaigns(SAMPLE.as_bytes()).expect("sample parses")
}

#[test]
fn sample_run_produces_every_view() {
    let _ = env_logger::builder().is_test(true).try_init();
    let pipeline = MetricsPipeline::build_test(42).unwrap();

    let out = pipeline.run(&sample(), "sample_campaigns.csv").unwrap();

    assert_eq!(out.derived.len(), 12);
    assert_eq!(out.clean.duplicates_removed, 0);
    assert!(!out.clean.has_negative_values());
    assert_eq!(out.platform_rollup.len(), 4);
    assert_eq!(out.category_rollup.len(), 7);
    assert_eq!(out.campaign_type_rollup.len(), 4);
    assert_eq!(out.reallocation.allocations.len(), 4);
    assert!((out.reallocation.weight_sum() - 1.0).abs() < 1e-9);

    let spend: f64 = out.platform_rollup.iter().map(|r| r.campaign_cost).sum();
    assert!((out.reallocation.total_budget - spend).abs() < 1e-9);
    assert_eq!(out.summary.total_campaigns, 12);
    assert_eq!(out.summary.total_sales, 2_895);
    assert_eq!(out.summary.total_revenue, 2_895.0 * 50.0);
}

#[test]
fn run_is_persisted_to_the_store() {
    let pipeline = MetricsPipeline::build_test(7).unwrap();
    let out = pipeline.run(&sample(), "sample").unwrap();
    let store = pipeline.store();

    let run = store.run(&out.run_id).unwrap().expect("run row");
    assert_eq!(run.seed, 7);
    assert_eq!(run.source, "sample");
    assert_eq!(store.derived_count(&out.run_id).unwrap(), 12);

    let (cost, revenue) = store.derived_totals(&out.run_id).unwrap();
    assert!((cost - out.summary.total_spend).abs() < 1e-6);
    assert!((revenue - out.summary.total_revenue).abs() < 1e-6);

    for key in [GroupKey::Platform, GroupKey::InfluencerCategory, GroupKey::CampaignType] {
        let stored = store.rollup_for(&out.run_id, key).unwrap();
        assert_eq!(stored, out.rollup(key), "stored {key} rollup differs");
    }

    let stored = store.allocations_for(&out.run_id).unwrap();
    assert_eq!(stored.allocations, out.reallocation.allocations);
}

#[test]
fn each_run_gets_its_own_id() {
    let pipeline = MetricsPipeline::build_test(42).unwrap();
    let a = pipeline.run(&sample(), "a").unwrap();
    let b = pipeline.run(&sample(), "b").unwrap();

    assert_ne!(a.run_id, b.run_id);
    assert_eq!(pipeline.store().run_count().unwrap(), 2);
    assert_eq!(a.derived, b.derived, "same seed must reproduce the same table");
}

#[test]
fn duplicates_are_dropped_before_costing() {
    let mut records = sample();
    records.push(records[0].clone());
    records.push(records[5].clone());

    let pipeline = MetricsPipeline::build_test(42).unwrap();
    let out = pipeline.run(&records, "dupes").unwrap();

    assert_eq!(out.clean.rows_in, 14);
    assert_eq!(out.clean.duplicates_removed, 2);
    assert_eq!(out.derived.len(), 12);
}

#[test]
fn failing_stage_persists_nothing() {
    let mut records = sample();
    records[4].estimated_reach = 0;

    let pipeline = MetricsPipeline::build_test(42).unwrap();
    let err = pipeline.run(&records, "bad").unwrap_err();

    assert!(matches!(err, MetricError::InvalidReach { row: 4, .. }));
    assert_eq!(pipeline.store().run_count().unwrap(), 0);
}

#[test]
fn negative_counts_are_reported_then_rejected() {
    let mut records = sample();
    records[2].estimated_reach = -300_000;

    let pipeline = MetricsPipeline::build_test(42).unwrap();
    let err = pipeline.run(&records, "negative").unwrap_err();
    assert!(matches!(err, MetricError::InvalidReach { row: 2, reach: -300_000 }));

    let report = campaign_metrics::clean::clean(&records);
    assert!(report.has_negative_values());
    assert_eq!(report.negative_counts["estimated_reach"], 1);
    assert_eq!(report.negative_counts["product_sales"], 0);
}

#[test]
fn unknown_platform_aborts_the_run() {
    let mut records = sample();
    records[9].platform = "Snapchat".into();

    let pipeline = MetricsPipeline::build_test(42).unwrap();
    match pipeline.run(&records, "unknown") {
        Err(MetricError::UnknownPlatform { row, platform }) => {
            assert_eq!(row, 9);
            assert_eq!(platform, "Snapchat");
        }
        other => panic!("expected UnknownPlatform, got {other:?}"),
    }
}

#[test]
fn row_errors_name_the_input_row_after_duplicates() {
    let mut records = sample();
    records.insert(1, records[0].clone());
    records[5].estimated_reach = 0;

    let pipeline = MetricsPipeline::build_test(42).unwrap();
    match pipeline.run(&records, "dupe-then-bad") {
        Err(MetricError::InvalidReach { row, reach }) => {
            assert_eq!(row, 5);
            assert_eq!(reach, 0);
        }
        other => panic!("expected InvalidReach, got {other:?}"),
    }

    let report = campaign_metrics::clean::clean(&records);
    assert_eq!(report.source_rows[..3], [0, 2, 3]);
    assert_eq!(report.source_rows.len(), report.records.len());
}

#[test]
fn unknown_platform_after_duplicate_names_the_input_row() {
    let mut records = sample();
    records.insert(0, records[0].clone());
    records[10].platform = "Snapchat".into();

    let pipeline = MetricsPipeline::build_test(42).unwrap();
    assert!(matches!(
        pipeline.run(&records, "dupe-then-unknown"),
        Err(MetricError::UnknownPlatform { row: 10, .. })
    ));
}
