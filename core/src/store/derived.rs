use super::MetricsStore;
use crate::{error::MetricResult, record::DerivedRecord, table::DATE_FORMAT};
use rusqlite::params;

impl MetricsStore {
    // ── Derived records ───────────────────────────────────────────

    /// Insert every derived row for a run in one transaction.
    pub fn insert_derived(&self, run_id: &str, rows: &[DerivedRecord]) -> MetricResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO derived_record (
                    run_id, row_index, platform, campaign_type, influencer_category,
                    start_date, end_date, engagements, estimated_reach, product_sales,
                    campaign_duration_days, campaign_cost, revenue, roas, cac,
                    engagement_rate, conversion_rate, year, month, quarter, day_of_week
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                          ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            )?;
            for (i, d) in rows.iter().enumerate() {
                let r = &d.record;
                stmt.execute(params![
                    run_id,
                    i as i64,
                    &r.platform,
                    &r.campaign_type,
                    &r.influencer_category,
                    r.start_date.format(DATE_FORMAT).to_string(),
                    r.end_date.format(DATE_FORMAT).to_string(),
                    r.engagements,
                    r.estimated_reach,
                    r.product_sales,
                    r.campaign_duration_days,
                    d.campaign_cost,
                    d.revenue,
                    d.roas,
                    d.cac,
                    d.engagement_rate,
                    d.conversion_rate,
                    d.year,
                    d.month,
                    d.quarter,
                    &d.day_of_week,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn derived_count(&self, run_id: &str) -> MetricResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM derived_record WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// Total cost and revenue stored for a run.
    pub fn derived_totals(&self, run_id: &str) -> MetricResult<(f64, f64)> {
        let totals = self.conn.query_row(
            "SELECT COALESCE(SUM(campaign_cost), 0.0), COALESCE(SUM(revenue), 0.0)
             FROM derived_record WHERE run_id = ?1",
            params![run_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(totals)
    }
}
