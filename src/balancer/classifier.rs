//! Tier Classifier
//!
//! Partitions a snapshot into hot and cold tier lists based on each
//! index's tier preference. Side-effect-free and order-preserving.

use crate::balancer::snapshot::IndexRecord;
use crate::domain::ports::TierPreference;

/// The partition of a snapshot into hot and cold tier lists.
///
/// Within each list, order equals the snapshot's listing order (oldest
/// first); eviction and demotion both rely on positional selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierSnapshot {
    pub hot: Vec<IndexRecord>,
    pub cold: Vec<IndexRecord>,
}

impl TierSnapshot {
    /// Total number of records across both tiers.
    pub fn len(&self) -> usize {
        self.hot.len() + self.cold.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hot.is_empty() && self.cold.is_empty()
    }
}

/// Partition records into hot and cold tier lists.
///
/// Every record lands in exactly one list; relative order is preserved.
pub fn classify(records: Vec<IndexRecord>) -> TierSnapshot {
    let mut snapshot = TierSnapshot::default();
    for record in records {
        match record.tier {
            TierPreference::Hot => snapshot.hot.push(record),
            TierPreference::Cold => snapshot.cold.push(record),
        }
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str, tier: TierPreference) -> IndexRecord {
        IndexRecord::new(name, 1 << 30, tier)
    }

    #[test]
    fn test_classify_splits_by_tier() {
        let records = vec![
            record("a", TierPreference::Hot),
            record("b", TierPreference::Cold),
            record("c", TierPreference::Hot),
        ];

        let snapshot = classify(records);
        assert_eq!(snapshot.hot.len(), 2);
        assert_eq!(snapshot.cold.len(), 1);
        assert_eq!(snapshot.hot[0].name, "a");
        assert_eq!(snapshot.hot[1].name, "c");
        assert_eq!(snapshot.cold[0].name, "b");
    }

    #[test]
    fn test_classify_empty() {
        let snapshot = classify(vec![]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
    }

    fn record_strategy() -> impl Strategy<Value = IndexRecord> {
        ("[a-z]{1,12}", 0u64..=1 << 40, prop::bool::ANY).prop_map(|(name, size, hot)| {
            IndexRecord::new(
                name,
                size,
                if hot {
                    TierPreference::Hot
                } else {
                    TierPreference::Cold
                },
            )
        })
    }

    proptest! {
        /// Every record appears in exactly one tier list, with its tier
        /// consistent with its setting, and order is preserved.
        #[test]
        fn prop_classification_partitions_fully(
            records in prop::collection::vec(record_strategy(), 0..64)
        ) {
            let snapshot = classify(records.clone());
            prop_assert_eq!(snapshot.len(), records.len());

            prop_assert!(snapshot.hot.iter().all(|r| r.tier == TierPreference::Hot));
            prop_assert!(snapshot.cold.iter().all(|r| r.tier == TierPreference::Cold));

            // Stable partition: concatenating per-tier sublists in input
            // order reproduces the input.
            let expected_hot: Vec<_> = records
                .iter()
                .filter(|r| r.tier == TierPreference::Hot)
                .cloned()
                .collect();
            let expected_cold: Vec<_> = records
                .iter()
                .filter(|r| r.tier == TierPreference::Cold)
                .cloned()
                .collect();
            prop_assert_eq!(snapshot.hot, expected_hot);
            prop_assert_eq!(snapshot.cold, expected_cold);
        }
    }
}
