//! Migration Planner
//!
//! Selects which hot indices are eligible for demotion to cold. Selection
//! is always a contiguous oldest-first prefix of the hot list, so demotions
//! target the oldest hot data and the newest stays hot.

use crate::balancer::snapshot::IndexRecord;
use crate::config::Limits;
use crate::size::to_gigabytes;

/// Select the prefix of hot indices to demote.
///
/// Walks the hot list in order accumulating size in bytes, converting to GB
/// once at each comparison point. As soon as the accumulated size exceeds
/// `hot_index_size_limit_gb` and the overflow beyond the limit exceeds
/// `hot_overflow_margin_gb`, selection stops and the prefix examined so far
/// is returned, inclusive of the crossing index. If the threshold is never
/// reached the selection is empty and no migration happens this run.
pub fn select_for_demotion<'a>(hot: &'a [IndexRecord], limits: &Limits) -> &'a [IndexRecord] {
    let mut accumulated_bytes: u64 = 0;

    for (i, record) in hot.iter().enumerate() {
        accumulated_bytes += record.size_bytes;
        let accumulated_gb = to_gigabytes(accumulated_bytes);
        let overflow_gb = accumulated_gb - limits.hot_index_size_limit_gb;
        if overflow_gb > 0.0 && overflow_gb > limits.hot_overflow_margin_gb {
            return &hot[..=i];
        }
    }

    &hot[..0]
}
