//! Eviction Planner
//!
//! Decides whether the cold tier has room for incoming demotions and, when
//! it does not, selects the minimal oldest-first set of cold indices to
//! delete. Planning is pure: the store is untouched here, and the caller
//! receives both the eviction set and the surviving cold list.

use crate::balancer::accountant::tier_size_bytes;
use crate::balancer::snapshot::IndexRecord;
use crate::config::Limits;
use crate::size::to_gigabytes;

/// True iff the cold tier can absorb `incoming_gb` without exceeding its
/// capacity limit.
pub fn would_fit_cold_tier(cold_size_gb: f64, incoming_gb: f64, limits: &Limits) -> bool {
    cold_size_gb + incoming_gb <= limits.cold_tier_size_limit_gb
}

/// The outcome of eviction planning: which cold indices to delete and
/// which remain as the new cold baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvictionPlan {
    /// Indices to delete, in removal order (oldest first).
    pub evicted: Vec<IndexRecord>,
    /// The cold list after removal, order preserved.
    pub remaining: Vec<IndexRecord>,
}

impl EvictionPlan {
    pub fn freed_bytes(&self) -> u64 {
        tier_size_bytes(&self.evicted)
    }

    pub fn freed_gb(&self) -> f64 {
        to_gigabytes(self.freed_bytes())
    }
}

/// Select the oldest cold indices to delete to free `excess_gb`.
///
/// Walks the cold list oldest-first accumulating size and stops, inclusive
/// of the crossing index, once the accumulated size exceeds `excess_gb`.
/// If the list is exhausted before the threshold is crossed, the plan
/// covers everything collected and may under-satisfy the target; the
/// caller decides what that means.
pub fn plan_eviction(cold: &[IndexRecord], excess_gb: f64) -> EvictionPlan {
    let mut evicted = Vec::new();
    let mut accumulated_bytes: u64 = 0;

    for record in cold {
        accumulated_bytes += record.size_bytes;
        evicted.push(record.clone());
        if to_gigabytes(accumulated_bytes) > excess_gb {
            break;
        }
    }

    let remaining = cold[evicted.len()..].to_vec();
    EvictionPlan { evicted, remaining }
}
