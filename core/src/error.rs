use crate::types::RowIndex;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("Unknown platform '{platform}' at row {row}: no rate configured")]
    UnknownPlatform { row: RowIndex, platform: String },

    #[error("Invalid reach at row {row}: estimated_reach must be > 0, got {reach}")]
    InvalidReach { row: RowIndex, reach: i64 },

    #[error("Invalid date range at row {row}: end {end} is before start {start}")]
    InvalidDateRange {
        row: RowIndex,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Non-positive campaign cost at row {row}: {cost}")]
    NonPositiveCost { row: RowIndex, cost: f64 },

    #[error("Degenerate efficiency for '{group}': {reason}")]
    DegenerateEfficiency { group: String, reason: String },

    #[error("Overflow summing {column} for '{group}'")]
    SumOverflow { group: String, column: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MetricError {
    /// Rewrite the row index of a per-row error. Other errors pass through.
    pub fn map_row(self, f: impl FnOnce(RowIndex) -> RowIndex) -> Self {
        match self {
            Self::UnknownPlatform { row, platform } => Self::UnknownPlatform {
                row: f(row),
                platform,
            },
            Self::InvalidReach { row, reach } => Self::InvalidReach { row: f(row), reach },
            Self::InvalidDateRange { row, start, end } => Self::InvalidDateRange {
                row: f(row),
                start,
                end,
            },
            Self::NonPositiveCost { row, cost } => Self::NonPositiveCost { row: f(row), cost },
            other => other,
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;
