use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Month keys as they appear in the settings file.
pub const MONTH_KEYS: [&str; 12] = [
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

/// Tolerance on the purchase share sum before validation rejects it.
const SHARE_SUM_EPSILON: f64 = 1e-6;

/// Simulation parameters supplied by the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub population_size: usize,
    pub horizon_days: u32,
    pub step_days: u32,
    /// Maximum mailings per calendar month, keyed "01".."12".
    pub mailing_quota_per_month: BTreeMap<String, u32>,
    /// Fraction of the buyer pool purchasing in each calendar month.
    pub purchase_share_per_month: BTreeMap<String, f64>,
    pub buyer_share: f64,
    /// Display names for weekday indexes 0 (Monday) through 6 (Sunday).
    pub weekday_names: Vec<String>,
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/simulation.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!(
            "config: loaded {path} (population={}, horizon={}d, step={}d)",
            config.population_size,
            config.horizon_days,
            config.step_days
        );
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.population_size == 0 {
            return Err(config_error("population_size must be positive"));
        }
        if self.horizon_days == 0 {
            return Err(config_error("horizon_days must be positive"));
        }
        if self.step_days == 0 {
            return Err(config_error("step_days must be positive"));
        }
        if !(0.0..=1.0).contains(&self.buyer_share) {
            return Err(config_error(format!(
                "buyer_share must lie in [0, 1], got {}",
                self.buyer_share
            )));
        }
        if self.weekday_names.len() != 7 {
            return Err(config_error(format!(
                "expected 7 weekday names, got {}",
                self.weekday_names.len()
            )));
        }
        check_month_keys("mailing_quota_per_month", self.mailing_quota_per_month.keys())?;
        check_month_keys("purchase_share_per_month", self.purchase_share_per_month.keys())?;

        let mut share_sum = 0.0;
        for (month, share) in &self.purchase_share_per_month {
            if !share.is_finite() || *share < 0.0 {
                return Err(config_error(format!(
                    "purchase share for month {month} must be a non-negative number, got {share}"
                )));
            }
            share_sum += share;
        }
        if share_sum <= 0.0 || share_sum > 1.0 + SHARE_SUM_EPSILON {
            return Err(config_error(format!(
                "purchase shares must sum to 1, got {share_sum:.4}"
            )));
        }
        if share_sum < 0.99 {
            log::warn!("config: purchase shares sum to {share_sum:.4}; part of the buyer pool is never scheduled");
        }
        Ok(())
    }

    pub fn mailing_quota(&self, month_key: &str) -> u32 {
        self.mailing_quota_per_month.get(month_key).copied().unwrap_or(0)
    }

    pub fn purchase_share(&self, month_key: &str) -> f64 {
        self.purchase_share_per_month.get(month_key).copied().unwrap_or(0.0)
    }

    /// Small, fast configuration for tests: 60 consumers over one year,
    /// four mailings per month, a fifth of consumers buying (one per month).
    pub fn default_test() -> Self {
        Self {
            population_size: 60,
            horizon_days: 365,
            step_days: 1,
            mailing_quota_per_month: MONTH_KEYS.iter().map(|m| (m.to_string(), 4)).collect(),
            purchase_share_per_month: MONTH_KEYS
                .iter()
                .map(|m| (m.to_string(), 1.0 / 12.0))
                .collect(),
            buyer_share: 0.2,
            weekday_names: [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        }
    }
}

fn check_month_keys<'a>(
    field: &str,
    keys: impl Iterator<Item = &'a String>,
) -> SimResult<()> {
    let found: Vec<&str> = keys.map(String::as_str).collect();
    if found != MONTH_KEYS {
        return Err(config_error(format!(
            "{field} must have exactly the keys 01..12, got {found:?}"
        )));
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> SimError {
    SimError::Configuration(msg.into())
}
