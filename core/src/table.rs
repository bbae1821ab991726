//! Delimited-text reader and writers.
//!
//! The reader is header driven: required columns are matched by name in
//! any order and extra columns are ignored. Quoted fields use `""` as the
//! escape for a literal quote. Quoted fields may not span lines.

use crate::{
    error::{MetricError, MetricResult},
    reallocation::Reallocation,
    record::{CampaignRecord, DerivedRecord},
    rollup::{GroupKey, GroupRollup},
};
use chrono::{NaiveDate, NaiveDateTime};
use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Write},
    path::Path,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED_COLUMNS: [&str; 9] = [
    "platform",
    "campaign_type",
    "influencer_category",
    "start_date",
    "end_date",
    "engagements",
    "estimated_reach",
    "product_sales",
    "campaign_duration_days",
];

const DERIVED_HEADER: [&str; 19] = [
    "platform",
    "campaign_type",
    "influencer_category",
    "start_date",
    "end_date",
    "engagements",
    "estimated_reach",
    "product_sales",
    "campaign_duration_days",
    "campaign_cost",
    "revenue",
    "ROAS",
    "CAC",
    "engagement_rate",
    "conversion_rate",
    "year",
    "month",
    "quarter",
    "day_of_week",
];

// ── Reading ──────────────────────────────────────────────────────────────────

pub fn read_campaigns_path(path: impl AsRef<Path>) -> MetricResult<Vec<CampaignRecord>> {
    let file = File::open(path.as_ref())?;
    read_campaigns(file)
}

pub fn read_campaigns<R: Read>(reader: R) -> MetricResult<Vec<CampaignRecord>> {
    let mut lines = BufReader::new(reader).lines();

    let header_line = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(MetricError::Parse {
                line: 1,
                message: "empty input: missing header row".into(),
            })
        }
    };
    let header = split_record(header_line.trim_start_matches('\u{feff}'), 1)?;
    let index = ColumnIndex::from_header(&header)?;

    let mut records = Vec::new();
    for (i, line) in lines.enumerate() {
        let line_no = i + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line, line_no)?;
        records.push(index.record(&fields, line_no)?);
    }

    log::info!("read_campaigns: loaded {} records", records.len());
    Ok(records)
}

/// Positions of the required columns within a header row.
struct ColumnIndex {
    positions: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> MetricResult<Self> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            positions[slot] = header
                .iter()
                .position(|h| h.trim() == *name)
                .ok_or_else(|| MetricError::Parse {
                    line: 1,
                    message: format!("missing required column '{name}'"),
                })?;
        }
        Ok(Self { positions })
    }

    fn field<'a>(&self, fields: &'a [String], slot: usize, line: usize) -> MetricResult<&'a str> {
        let pos = self.positions[slot];
        fields
            .get(pos)
            .map(|f| f.trim())
            .ok_or_else(|| MetricError::Parse {
                line,
                message: format!(
                    "expected at least {} fields, found {}",
                    pos + 1,
                    fields.len()
                ),
            })
    }

    fn record(&self, fields: &[String], line: usize) -> MetricResult<CampaignRecord> {
        Ok(CampaignRecord {
            platform: self.field(fields, 0, line)?.to_string(),
            campaign_type: self.field(fields, 1, line)?.to_string(),
            influencer_category: self.field(fields, 2, line)?.to_string(),
            start_date: parse_date(self.field(fields, 3, line)?, "start_date", line)?,
            end_date: parse_date(self.field(fields, 4, line)?, "end_date", line)?,
            engagements: parse_count(self.field(fields, 5, line)?, "engagements", line)?,
            estimated_reach: parse_count(self.field(fields, 6, line)?, "estimated_reach", line)?,
            product_sales: parse_count(self.field(fields, 7, line)?, "product_sales", line)?,
            campaign_duration_days: parse_count(
                self.field(fields, 8, line)?,
                "campaign_duration_days",
                line,
            )?,
        })
    }
}

/// Split one line into fields, honouring double quotes.
fn split_record(line: &str, line_no: usize) -> MetricResult<Vec<String>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (other, _) => current.push(other),
        }
    }
    if in_quotes {
        return Err(MetricError::Parse {
            line: line_no,
            message: "unterminated quoted field".into(),
        });
    }
    fields.push(current);
    Ok(fields)
}

fn parse_date(raw: &str, column: &str, line: usize) -> MetricResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|e| MetricError::Parse {
            line,
            message: format!("{column}: cannot parse date '{raw}': {e}"),
        })
}

/// Integers, or floats with no fractional part ("1200.0") that fit in an i64.
fn parse_count(raw: &str, column: &str, line: usize) -> MetricResult<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(MetricError::Parse {
            line,
            message: format!("{column}: expected an integer, got '{raw}'"),
        }),
    }
}

// ── Writing ──────────────────────────────────────────────────────────────────

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn money(v: f64) -> String {
    format!("{v:.2}")
}

pub fn write_derived<W: Write>(mut w: W, rows: &[DerivedRecord]) -> MetricResult<()> {
    writeln!(w, "{}", DERIVED_HEADER.join(","))?;
    for row in rows {
        let r = &row.record;
        let cells = [
            escape(&r.platform),
            escape(&r.campaign_type),
            escape(&r.influencer_category),
            r.start_date.format(DATE_FORMAT).to_string(),
            r.end_date.format(DATE_FORMAT).to_string(),
            r.engagements.to_string(),
            r.estimated_reach.to_string(),
            r.product_sales.to_string(),
            r.campaign_duration_days.to_string(),
            money(row.campaign_cost),
            money(row.revenue),
            money(row.roas),
            money(row.cac),
            money(row.engagement_rate),
            money(row.conversion_rate),
            row.year.to_string(),
            row.month.to_string(),
            row.quarter.to_string(),
            row.day_of_week.clone(),
        ];
        writeln!(w, "{}", cells.join(","))?;
    }
    Ok(())
}

pub fn write_rollup<W: Write>(mut w: W, key: GroupKey, rows: &[GroupRollup]) -> MetricResult<()> {
    writeln!(
        w,
        "{},total_campaigns,campaign_cost,revenue,product_sales,ROAS,CAC,\
         engagement_rate,conversion_rate,efficiency_score",
        key.column_name()
    )?;
    for r in rows {
        writeln!(
            w,
            "{},{},{:.2},{:.2},{},{:.2},{:.2},{:.2},{:.2},{:.2}",
            escape(&r.group),
            r.total_campaigns,
            r.campaign_cost,
            r.revenue,
            r.product_sales,
            r.roas,
            r.cac,
            r.engagement_rate,
            r.conversion_rate,
            r.efficiency_score
        )?;
    }
    Ok(())
}

pub fn write_allocations<W: Write>(mut w: W, realloc: &Reallocation) -> MetricResult<()> {
    writeln!(
        w,
        "platform,efficiency_score,current_budget,weight,recommended_budget,change_pct"
    )?;
    for a in &realloc.allocations {
        writeln!(
            w,
            "{},{:.2},{:.2},{:.4},{:.2},{:.1}",
            escape(&a.group),
            a.efficiency_score,
            a.current_budget,
            a.weight,
            a.recommended_budget,
            a.change_pct
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::split_record;

    #[test]
    fn split_handles_quotes_and_escapes() {
        let fields = split_record(r#"a,"b,c","say ""hi""",,d"#, 2).unwrap();
        assert_eq!(fields, vec!["a", "b,c", "say \"hi\"", "", "d"]);
    }

    #[test]
    fn split_strips_carriage_return() {
        let fields = split_record("x,y\r", 2).unwrap();
        assert_eq!(fields, vec!["x", "y"]);
    }

    #[test]
    fn unterminated_quote_is_a_parse_error() {
        assert!(split_record(r#"a,"b"#, 7).is_err());
    }
}
