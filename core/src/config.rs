use crate::{
    error::{MetricError, MetricResult},
    types::{DEFAULT_AVERAGE_ORDER_VALUE, DEFAULT_RANDOMNESS_BOUND},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CONFIG_FILE: &str = "metrics_config.json";

fn default_randomness_bound() -> f64 {
    DEFAULT_RANDOMNESS_BOUND
}

fn default_seed() -> u64 {
    42
}

fn default_average_order_value() -> f64 {
    DEFAULT_AVERAGE_ORDER_VALUE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// CPM-style rate per platform: cost per 1000 units of reach.
    pub platform_rates: BTreeMap<String, f64>,
    #[serde(default = "default_randomness_bound")]
    pub randomness_bound: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_average_order_value")]
    pub average_order_value: f64,
}

impl MetricsConfig {
    /// Load from the data/ directory.
    /// In tests, use MetricsConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE}");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MetricsConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let platform_rates = [
            ("Instagram", 7.0),
            ("YouTube", 10.0),
            ("TikTok", 6.0),
            ("Twitter", 5.0),
        ]
        .into_iter()
        .map(|(name, rate)| (name.to_string(), rate))
        .collect();

        Self {
            platform_rates,
            randomness_bound: DEFAULT_RANDOMNESS_BOUND,
            seed: default_seed(),
            average_order_value: DEFAULT_AVERAGE_ORDER_VALUE,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> MetricResult<()> {
        validate_bound(self.randomness_bound)?;
        validate_rates(&self.platform_rates)?;
        if !(self.average_order_value.is_finite() && self.average_order_value > 0.0) {
            return Err(MetricError::InvalidConfig(format!(
                "average_order_value must be > 0, got {}",
                self.average_order_value
            )));
        }
        Ok(())
    }
}

/// The perturbation factor (1 + u) must stay strictly positive.
pub(crate) fn validate_bound(bound: f64) -> MetricResult<()> {
    if !(bound.is_finite() && (0.0..1.0).contains(&bound)) {
        return Err(MetricError::InvalidConfig(format!(
            "randomness_bound must be in [0, 1), got {bound}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_rates(rates: &BTreeMap<String, f64>) -> MetricResult<()> {
    for (platform, rate) in rates {
        if !(rate.is_finite() && *rate > 0.0) {
            return Err(MetricError::InvalidConfig(format!(
                "rate for platform '{platform}' must be > 0, got {rate}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let json = r#"{ "platform_rates": { "Instagram": 7.0 } }"#;
        let config: MetricsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.randomness_bound, 0.20);
        assert_eq!(config.average_order_value, 50.0);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_bound_of_one() {
        let mut config = MetricsConfig::default_test();
        config.randomness_bound = 1.0;
        assert!(matches!(config.validate(), Err(MetricError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_rate() {
        let mut config = MetricsConfig::default_test();
        config.platform_rates.insert("Snapchat".into(), 0.0);
        assert!(matches!(config.validate(), Err(MetricError::InvalidConfig(_))));
    }
}
