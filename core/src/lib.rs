//! Campaign metrics: derived ratios, platform rollups and
//! efficiency-weighted budget reallocation for influencer campaigns.

pub mod analysis;
pub mod clean;
pub mod config;
pub mod cost;
pub mod error;
pub mod pipeline;
pub mod ratios;
pub mod reallocation;
pub mod record;
pub mod rng;
pub mod rollup;
pub mod store;
pub mod summary;
pub mod table;
pub mod types;

pub use cost::derive_costs;
pub use error::{MetricError, MetricResult};
pub use ratios::derive_ratios;
pub use reallocation::compute_reallocation;
pub use rollup::{compute_rollup, GroupKey};
