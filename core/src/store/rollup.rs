use super::MetricsStore;
use crate::{
    error::MetricResult,
    reallocation::{Allocation, Reallocation},
    rollup::{GroupKey, GroupRollup},
};
use rusqlite::params;

impl MetricsStore {
    // ── Rollups ───────────────────────────────────────────────────

    pub fn insert_rollup(&self, run_id: &str, key: GroupKey, rows: &[GroupRollup]) -> MetricResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO rollup (
                    run_id, group_key, rank, group_name, total_campaigns, campaign_cost,
                    revenue, product_sales, roas, cac, engagement_rate, conversion_rate,
                    efficiency_score
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;
            for (rank, r) in rows.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    key.column_name(),
                    rank as i64,
                    &r.group,
                    r.total_campaigns as i64,
                    r.campaign_cost,
                    r.revenue,
                    r.product_sales,
                    r.roas,
                    r.cac,
                    r.engagement_rate,
                    r.conversion_rate,
                    r.efficiency_score,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Rollup rows for a run in emission order.
    pub fn rollup_for(&self, run_id: &str, key: GroupKey) -> MetricResult<Vec<GroupRollup>> {
        let mut stmt = self.conn.prepare(
            "SELECT group_name, total_campaigns, campaign_cost, revenue, product_sales,
                    roas, cac, engagement_rate, conversion_rate, efficiency_score
             FROM rollup WHERE run_id = ?1 AND group_key = ?2
             ORDER BY rank ASC",
        )?;
        let rows = stmt.query_map(params![run_id, key.column_name()], |row| {
            Ok(GroupRollup {
                group: row.get(0)?,
                total_campaigns: row.get::<_, i64>(1)? as u64,
                campaign_cost: row.get(2)?,
                revenue: row.get(3)?,
                product_sales: row.get(4)?,
                roas: row.get(5)?,
                cac: row.get(6)?,
                engagement_rate: row.get(7)?,
                conversion_rate: row.get(8)?,
                efficiency_score: row.get(9)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Allocations ───────────────────────────────────────────────

    pub fn insert_allocations(&self, run_id: &str, realloc: &Reallocation) -> MetricResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO allocation (
                    run_id, rank, group_name, efficiency_score, current_budget,
                    weight, recommended_budget, change_pct
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for (rank, a) in realloc.allocations.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    rank as i64,
                    &a.group,
                    a.efficiency_score,
                    a.current_budget,
                    a.weight,
                    a.recommended_budget,
                    a.change_pct,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn allocations_for(&self, run_id: &str) -> MetricResult<Reallocation> {
        let mut stmt = self.conn.prepare(
            "SELECT group_name, efficiency_score, current_budget, weight,
                    recommended_budget, change_pct
             FROM allocation WHERE run_id = ?1
             ORDER BY rank ASC",
        )?;
        let allocations = stmt
            .query_map(params![run_id], |row| {
                Ok(Allocation {
                    group: row.get(0)?,
                    efficiency_score: row.get(1)?,
                    current_budget: row.get(2)?,
                    weight: row.get(3)?,
                    recommended_budget: row.get(4)?,
                    change_pct: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let total_budget = allocations.iter().map(|a| a.current_budget).sum();
        Ok(Reallocation {
            total_budget,
            allocations,
        })
    }
}
