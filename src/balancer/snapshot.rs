//! Index Snapshot Loader
//!
//! Queries the index store once per run and merges the size listing with
//! the tier-settings listing into one record per index. The result is
//! immutable for the rest of the run.

use tracing::{debug, instrument, warn};

use crate::domain::ports::{IndexStore, TierPreference};
use crate::error::{Error, Result};
use crate::size::parse_size;

/// One storage index as seen at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub name: String,
    pub size_bytes: u64,
    pub tier: TierPreference,
}

impl IndexRecord {
    pub fn new(name: impl Into<String>, size_bytes: u64, tier: TierPreference) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            tier,
        }
    }
}

/// Load a fresh snapshot of all indices matching the pattern.
///
/// Store connectivity errors are fatal for the run and propagate; no retry
/// is performed. An index present in the size listing but missing from the
/// settings listing (or vice versa) is excluded with a warning, as is an
/// index whose size string cannot be parsed. Record order follows the size
/// listing, i.e. the store's natural order, oldest first.
#[instrument(skip(store))]
pub async fn load_snapshot(store: &dyn IndexStore, pattern: &str) -> Result<Vec<IndexRecord>> {
    let stats = store.list_indices(pattern).await?;
    let mut settings = store.tier_settings(pattern).await?;

    let mut records = Vec::with_capacity(stats.len());
    for stat in stats {
        let Some(setting) = settings.remove(&stat.name) else {
            warn!(
                index = %stat.name,
                "skipping index: {}",
                Error::InconsistentSnapshot {
                    index: stat.name.clone()
                }
            );
            continue;
        };

        let size_bytes = match parse_size(&stat.size) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(index = %stat.name, "skipping index: {}", e);
                continue;
            }
        };

        records.push(IndexRecord {
            name: stat.name,
            size_bytes,
            tier: TierPreference::from_setting(setting.as_deref()),
        });
    }

    // Settings entries with no size row are the other half of the
    // inconsistent-snapshot policy.
    for name in settings.keys() {
        warn!(
            index = %name,
            "skipping index: {}",
            Error::InconsistentSnapshot { index: name.clone() }
        );
    }

    debug!(count = records.len(), "snapshot loaded");
    Ok(records)
}
