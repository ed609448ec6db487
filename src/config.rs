//! Balancer configuration
//!
//! The three capacity thresholds driving demotion and eviction decisions.
//! Limits can be loaded from a YAML file; unrecognized fields are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default capacity trigger for starting demotion from the hot tier.
pub const DEFAULT_HOT_INDEX_SIZE_LIMIT_GB: f64 = 600.0;

/// Default minimum overflow before demotion is worth doing.
pub const DEFAULT_HOT_OVERFLOW_MARGIN_GB: f64 = 50.0;

/// Default capacity ceiling for the cold tier.
pub const DEFAULT_COLD_TIER_SIZE_LIMIT_GB: f64 = 1200.0;

/// Capacity limits for the hot and cold tiers.
///
/// Exactly three fields are recognized; anything else in a limits file is
/// a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Limits {
    /// Capacity trigger for starting demotion from hot, in GB.
    #[serde(rename = "hotIndexSizeLimitGB")]
    pub hot_index_size_limit_gb: f64,

    /// Minimum overflow beyond the hot limit before demotion happens, in GB.
    /// Avoids thrashing on marginal overflows.
    #[serde(rename = "hotOverflowMarginGB")]
    pub hot_overflow_margin_gb: f64,

    /// Capacity ceiling for the cold tier, in GB.
    #[serde(rename = "coldTierSizeLimitGB")]
    pub cold_tier_size_limit_gb: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            hot_index_size_limit_gb: DEFAULT_HOT_INDEX_SIZE_LIMIT_GB,
            hot_overflow_margin_gb: DEFAULT_HOT_OVERFLOW_MARGIN_GB,
            cold_tier_size_limit_gb: DEFAULT_COLD_TIER_SIZE_LIMIT_GB,
        }
    }
}

impl Limits {
    /// Load limits from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let limits: Limits = serde_yaml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid limits file {}: {}", path.display(), e)))?;
        limits.validate()?;
        Ok(limits)
    }

    /// Reject thresholds that can never produce a sensible plan.
    pub fn validate(&self) -> Result<()> {
        if self.hot_index_size_limit_gb < 0.0 {
            return Err(Error::Config("hotIndexSizeLimitGB must be >= 0".into()));
        }
        if self.hot_overflow_margin_gb < 0.0 {
            return Err(Error::Config("hotOverflowMarginGB must be >= 0".into()));
        }
        if self.cold_tier_size_limit_gb < 0.0 {
            return Err(Error::Config("coldTierSizeLimitGB must be >= 0".into()));
        }
        Ok(())
    }
}
