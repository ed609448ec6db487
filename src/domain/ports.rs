//! Domain Ports (Port/Adapter Pattern)
//!
//! The balancer's core depends on an index store capability: list indices
//! with size and tier-setting metadata, change an index's tier setting,
//! delete an index. Infrastructure adapters implement this trait so the
//! core never sees HTTP.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Value Objects
// =============================================================================

/// Settings key controlling where the store allocates an index.
pub const TIER_PREFERENCE_SETTING: &str = "index.routing.allocation.include._tier_preference";

/// Storage tier an index prefers, derived from its allocation setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierPreference {
    Hot,
    Cold,
}

impl TierPreference {
    /// Derive the tier from a raw allocation setting.
    ///
    /// `data_content` maps to hot; every other value, including an absent
    /// setting, maps to cold.
    pub fn from_setting(setting: Option<&str>) -> Self {
        match setting {
            Some("data_content") => TierPreference::Hot,
            _ => TierPreference::Cold,
        }
    }

    /// The allocation setting value written to the store for this tier.
    pub fn setting_value(&self) -> &'static str {
        match self {
            TierPreference::Hot => "data_content",
            TierPreference::Cold => "data_cold",
        }
    }
}

impl std::fmt::Display for TierPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierPreference::Hot => write!(f, "hot"),
            TierPreference::Cold => write!(f, "cold"),
        }
    }
}

/// One row of the store's size listing.
///
/// `size` is the store's human-readable size string ("512mb", "2gb"); the
/// snapshot loader converts it to bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub name: String,
    pub size: String,
}

impl IndexStats {
    pub fn new(name: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
        }
    }
}

// =============================================================================
// Index Store Port
// =============================================================================

/// Port for the index store the balancer rebalances.
///
/// Sizes and tier settings come from separate listings merged by name;
/// callers must not assume every listed index resolves in both.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// List all indices matching the name pattern, with their sizes, in the
    /// store's natural listing order (treated as age order, oldest first).
    async fn list_indices(&self, pattern: &str) -> Result<Vec<IndexStats>>;

    /// Fetch the raw tier-preference setting for every index matching the
    /// name pattern. `None` means the index carries no allocation setting.
    async fn tier_settings(&self, pattern: &str) -> Result<HashMap<String, Option<String>>>;

    /// Change an index's tier-preference setting.
    async fn set_tier_preference(&self, index: &str, tier: TierPreference) -> Result<()>;

    /// Permanently delete an index.
    async fn delete_index(&self, index: &str) -> Result<()>;
}

// =============================================================================
// Tests
// =============================================================================
