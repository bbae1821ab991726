//! Group-by rollup tests.

use campaign_metrics::{
    compute_rollup, derive_ratios,
    record::{CampaignRecord, CostedRecord, DerivedRecord},
    GroupKey, MetricError,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

fn row(platform: &str, category: &str, sales: i64, cost: f64) -> CostedRecord {
    CostedRecord {
        record: CampaignRecord {
            platform: platform.into(),
            campaign_type: "Product Launch".into(),
            influencer_category: category.into(),
            start_date: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 2, 8).unwrap(),
            engagements: 2_000,
            estimated_reach: 100_000,
            product_sales: sales,
            campaign_duration_days: 7,
        },
        campaign_cost: cost,
    }
}

fn derived(rows: &[CostedRecord]) -> Vec<DerivedRecord> {
    derive_ratios(rows, 50.0).expect("derive")
}

#[test]
fn sums_and_means_per_platform() {
    let rows = derived(&[
        row("Instagram", "Beauty", 100, 100.0), // roas 50, cac 1
        row("Instagram", "Beauty", 0, 50.0),    // roas 0,  cac 50
        row("YouTube", "Tech", 200, 400.0),     // roas 25, cac 2
    ]);

    let rollup = compute_rollup(&rows, GroupKey::Platform).unwrap();

    assert_eq!(rollup.len(), 2);
    let yt = &rollup[0];
    assert_eq!(yt.group, "YouTube");
    assert_eq!(yt.total_campaigns, 1);
    assert_eq!(yt.revenue, 10_000.0);
    assert_eq!(yt.efficiency_score, 12.5);

    let ig = &rollup[1];
    assert_eq!(ig.group, "Instagram");
    assert_eq!(ig.total_campaigns, 2);
    assert_eq!(ig.campaign_cost, 150.0);
    assert_eq!(ig.revenue, 5_000.0);
    assert_eq!(ig.product_sales, 100);
    assert_eq!(ig.roas, 25.0);
    assert_eq!(ig.cac, 25.5);
    assert_eq!(ig.engagement_rate, 2.0);
    assert!((ig.efficiency_score - 25.0 / 25.5).abs() < 1e-12);
}

#[test]
fn ordered_by_revenue_then_group_name() {
    let rows = derived(&[
        row("Twitter", "Tech", 10, 50.0),
        row("TikTok", "Tech", 10, 60.0),
        row("YouTube", "Tech", 30, 90.0),
        row("Instagram", "Tech", 10, 70.0),
    ]);

    let rollup = compute_rollup(&rows, GroupKey::Platform).unwrap();
    let order: Vec<_> = rollup.iter().map(|r| r.group.as_str()).collect();

    assert_eq!(order, vec!["YouTube", "Instagram", "TikTok", "Twitter"]);
}

#[test]
fn groups_are_exactly_the_distinct_values() {
    let rows = derived(&[
        row("Instagram", "Beauty", 5, 10.0),
        row("TikTok", "Fashion", 5, 10.0),
        row("Instagram", "Fashion", 5, 10.0),
        row("Twitter", "Gaming", 5, 10.0),
    ]);

    for key in [GroupKey::Platform, GroupKey::InfluencerCategory, GroupKey::CampaignType] {
        let rollup = compute_rollup(&rows, key).unwrap();
        let groups: BTreeSet<_> = rollup.iter().map(|r| r.group.clone()).collect();
        let expected: BTreeSet<_> = rows.iter().map(|r| key.value_of(r).to_string()).collect();
        assert_eq!(groups, expected, "group set mismatch for {key}");
        let campaigns: u64 = rollup.iter().map(|r| r.total_campaigns).sum();
        assert_eq!(campaigns, rows.len() as u64);
    }
}

/// A cost below half a cent rounds CAC to zero, leaving efficiency undefined.
#[test]
fn zero_mean_cac_is_degenerate() {
    let rows = derived(&[
        row("Instagram", "Beauty", 10, 80.0),
        row("Twitter", "Tech", 1, 0.001),
    ]);
    assert_eq!(rows[1].cac, 0.0);

    match compute_rollup(&rows, GroupKey::Platform) {
        Err(MetricError::DegenerateEfficiency { group, .. }) => assert_eq!(group, "Twitter"),
        other => panic!("expected DegenerateEfficiency, got {other:?}"),
    }
}

#[test]
fn empty_input_gives_empty_rollup() {
    let rollup = compute_rollup(&[], GroupKey::Platform).unwrap();
    assert!(rollup.is_empty());
}

#[test]
fn group_key_parses_from_column_names() {
    assert_eq!("platform".parse::<GroupKey>().unwrap(), GroupKey::Platform);
    assert_eq!("campaign_type".parse::<GroupKey>().unwrap(), GroupKey::CampaignType);
    assert_eq!(
        "influencer_category".parse::<GroupKey>().unwrap(),
        GroupKey::InfluencerCategory
    );
    assert!("region".parse::<GroupKey>().is_err());
}

#[test]
fn sales_total_past_i64_is_an_error() {
    let big = i64::MAX / 2 + 1;
    let rows = derived(&[
        row("Instagram", "Beauty", big, 100.0),
        row("Instagram", "Tech", big, 100.0),
    ]);

    match compute_rollup(&rows, GroupKey::Platform) {
        Err(MetricError::SumOverflow { group, column }) => {
            assert_eq!(group, "Instagram");
            assert_eq!(column, "product_sales");
        }
        other => panic!("expected SumOverflow, got {other:?}"),
    }
}
