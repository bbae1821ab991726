//! Row-wise ratio metrics and calendar columns.
//!
//! RULE: every metric is rounded at its own computation from unrounded
//! inputs. Nothing here is computed from an already-rounded metric.

use crate::{
    error::{MetricError, MetricResult},
    record::{CostedRecord, DerivedRecord},
    types::round2,
};
use chrono::{Datelike, Weekday};

/// Derive revenue, ROAS, CAC, rates and calendar fields for every row.
///
/// No partial output: the first invalid row aborts the whole batch.
pub fn derive_ratios(
    records: &[CostedRecord],
    average_order_value: f64,
) -> MetricResult<Vec<DerivedRecord>> {
    if !(average_order_value.is_finite() && average_order_value > 0.0) {
        return Err(MetricError::InvalidConfig(format!(
            "average_order_value must be > 0, got {average_order_value}"
        )));
    }

    records
        .iter()
        .enumerate()
        .map(|(row, costed)| derive_row(row, costed, average_order_value))
        .collect()
}

fn derive_row(row: usize, costed: &CostedRecord, aov: f64) -> MetricResult<DerivedRecord> {
    let r = &costed.record;
    if r.estimated_reach <= 0 {
        return Err(MetricError::InvalidReach {
            row,
            reach: r.estimated_reach,
        });
    }
    if r.end_date < r.start_date {
        return Err(MetricError::InvalidDateRange {
            row,
            start: r.start_date,
            end: r.end_date,
        });
    }
    let cost = costed.campaign_cost;
    if !(cost.is_finite() && cost > 0.0) {
        return Err(MetricError::NonPositiveCost { row, cost });
    }

    let reach = r.estimated_reach as f64;
    let sales = r.product_sales as f64;
    let revenue = sales * aov;
    // Zero-sale rows divide by 1. This is a business rule, not a guard.
    let customers = r.product_sales.max(1) as f64;

    Ok(DerivedRecord {
        record: r.clone(),
        campaign_cost: cost,
        revenue,
        roas: round2(revenue / cost),
        cac: round2(cost / customers),
        engagement_rate: round2(r.engagements as f64 / reach * 100.0),
        conversion_rate: round2(sales / reach * 100.0),
        year: r.start_date.year(),
        month: r.start_date.month(),
        quarter: (r.start_date.month() - 1) / 3 + 1,
        day_of_week: weekday_name(r.start_date.weekday()).to_string(),
    })
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
