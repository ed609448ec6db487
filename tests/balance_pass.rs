//! Balance Pass Integration Tests
//!
//! Drives `Balancer::run_pass` end to end against an in-memory index
//! store, covering demotion, eviction, abort and idempotence behavior.

use std::collections::HashMap;
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use parking_lot::Mutex;

use coldwarden::adapters::{InMemoryEventCollector, LoggingEventPublisher};
use coldwarden::balancer::{Balancer, BalancerConfig, PassOutcome};
use coldwarden::config::Limits;
use coldwarden::domain::events::EventPublisher;
use coldwarden::domain::ports::{IndexStats, IndexStore, TierPreference};
use coldwarden::error::{Error, Result};

// =============================================================================
// In-Memory Index Store
// =============================================================================

#[derive(Debug, Clone)]
struct MockIndex {
    name: String,
    size: String,
    setting: Option<String>,
    /// Simulates an index present in the size listing but absent from
    /// settings metadata.
    missing_settings: bool,
}

impl MockIndex {
    fn hot(name: &str, size: &str) -> Self {
        Self {
            name: name.to_string(),
            size: size.to_string(),
            setting: Some("data_content".to_string()),
            missing_settings: false,
        }
    }

    fn cold(name: &str, size: &str) -> Self {
        Self {
            name: name.to_string(),
            size: size.to_string(),
            setting: Some("data_cold".to_string()),
            missing_settings: false,
        }
    }
}

#[derive(Default)]
struct MockStore {
    indices: Mutex<Vec<MockIndex>>,
    deleted: Mutex<Vec<String>>,
    tier_updates: Mutex<Vec<(String, TierPreference)>>,
    fail_listing: bool,
}

impl MockStore {
    fn new(indices: Vec<MockIndex>) -> Arc<Self> {
        Arc::new(Self {
            indices: Mutex::new(indices),
            ..Default::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_listing: true,
            ..Default::default()
        })
    }

    fn deleted(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    fn tier_updates(&self) -> Vec<(String, TierPreference)> {
        self.tier_updates.lock().clone()
    }
}

#[async_trait]
impl IndexStore for MockStore {
    async fn list_indices(&self, _pattern: &str) -> Result<Vec<IndexStats>> {
        if self.fail_listing {
            return Err(Error::StoreQuery("503 Service Unavailable".to_string()));
        }
        Ok(self
            .indices
            .lock()
            .iter()
            .map(|i| IndexStats::new(i.name.clone(), i.size.clone()))
            .collect())
    }

    async fn tier_settings(&self, _pattern: &str) -> Result<HashMap<String, Option<String>>> {
        Ok(self
            .indices
            .lock()
            .iter()
            .filter(|i| !i.missing_settings)
            .map(|i| (i.name.clone(), i.setting.clone()))
            .collect())
    }

    async fn set_tier_preference(&self, index: &str, tier: TierPreference) -> Result<()> {
        self.tier_updates
            .lock()
            .push((index.to_string(), tier));
        if let Some(entry) = self.indices.lock().iter_mut().find(|i| i.name == index) {
            entry.setting = Some(tier.setting_value().to_string());
        }
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        self.deleted.lock().push(index.to_string());
        self.indices.lock().retain(|i| i.name != index);
        Ok(())
    }
}

fn balancer(store: Arc<MockStore>, limits: Limits, dry_run: bool) -> Balancer {
    Balancer::new(
        store,
        Arc::new(LoggingEventPublisher::debug_level()),
        BalancerConfig {
            index_pattern: "logstash-*".to_string(),
            limits,
            dry_run,
        },
    )
}

fn limits(hot: f64, margin: f64, cold: f64) -> Limits {
    Limits {
        hot_index_size_limit_gb: hot,
        hot_overflow_margin_gb: margin,
        cold_tier_size_limit_gb: cold,
    }
}

// =============================================================================
// Demotion
// =============================================================================

#[tokio::test]
async fn demotes_oldest_prefix_when_hot_overflows() {
    // Five 150 GB hot indices (750 GB total), limit 600, margin 50: the
    // cumulative size passes 650 at the fifth index, so all five are
    // demoted. Cold tier is empty with plenty of headroom, no eviction.
    let store = MockStore::new(vec![
        MockIndex::hot("logstash-2021.01.01", "150gb"),
        MockIndex::hot("logstash-2021.01.02", "150gb"),
        MockIndex::hot("logstash-2021.01.03", "150gb"),
        MockIndex::hot("logstash-2021.01.04", "150gb"),
        MockIndex::hot("logstash-2021.01.05", "150gb"),
    ]);

    let report = balancer(store.clone(), limits(600.0, 50.0, 1200.0), false)
        .run_pass()
        .await
        .unwrap();

    assert_eq!(report.outcome, PassOutcome::Success);
    assert_eq!(report.hot_size_gb, 750.0);
    assert_eq!(report.cold_size_gb, 0.0);
    assert!(store.deleted().is_empty());

    let updates = store.tier_updates();
    assert_eq!(updates.len(), 5);
    // Oldest first, every update targets the cold tier
    for (i, (name, tier)) in updates.iter().enumerate() {
        assert_eq!(name, &format!("logstash-2021.01.{:02}", i + 1));
        assert_eq!(*tier, TierPreference::Cold);
    }
}

#[tokio::test]
async fn no_transferable_indices_when_hot_within_limits() {
    let store = MockStore::new(vec![
        MockIndex::hot("logstash-2021.01.01", "100gb"),
        MockIndex::hot("logstash-2021.01.02", "100gb"),
        MockIndex::cold("logstash-2020.12.01", "400gb"),
    ]);

    let report = balancer(store.clone(), limits(600.0, 50.0, 1200.0), false)
        .run_pass()
        .await
        .unwrap();

    assert_eq!(report.outcome, PassOutcome::NoTransferableIndices);
    assert!(store.deleted().is_empty());
    assert!(store.tier_updates().is_empty());
}

#[tokio::test]
async fn second_pass_is_idempotent() {
    let store = MockStore::new(vec![
        MockIndex::hot("logstash-2021.01.01", "150gb"),
        MockIndex::hot("logstash-2021.01.02", "150gb"),
        MockIndex::hot("logstash-2021.01.03", "150gb"),
        MockIndex::hot("logstash-2021.01.04", "150gb"),
        MockIndex::hot("logstash-2021.01.05", "150gb"),
    ]);
    let lim = limits(600.0, 50.0, 1200.0);

    let first = balancer(store.clone(), lim, false).run_pass().await.unwrap();
    assert_eq!(first.outcome, PassOutcome::Success);
    assert_eq!(store.tier_updates().len(), 5);

    // The demoted settings are now visible in the store; with no net new
    // data the recomputed hot list is empty and nothing further happens.
    let second = balancer(store.clone(), lim, false).run_pass().await.unwrap();
    assert_eq!(second.outcome, PassOutcome::NoTransferableIndices);
    assert_eq!(store.tier_updates().len(), 5);
    assert!(store.deleted().is_empty());
}

// =============================================================================
// Eviction
// =============================================================================

#[tokio::test]
async fn evicts_oldest_cold_until_demotions_fit() {
    // 100 GB of demotions incoming, cold tier at 1150 GB with a 1200 GB
    // limit: 50 GB over budget. The two oldest cold indices (40 + 30 GB)
    // are deleted, then the demotions proceed.
    let store = MockStore::new(vec![
        MockIndex::hot("logstash-2021.02.01", "50gb"),
        MockIndex::hot("logstash-2021.02.02", "50gb"),
        MockIndex::cold("logstash-2020.11.01", "40gb"),
        MockIndex::cold("logstash-2020.11.02", "30gb"),
        MockIndex::cold("logstash-2020.11.03", "1080gb"),
    ]);

    let report = balancer(store.clone(), limits(40.0, 50.0, 1200.0), false)
        .run_pass()
        .await
        .unwrap();

    assert_eq!(report.outcome, PassOutcome::Success);
    assert_eq!(
        store.deleted(),
        vec!["logstash-2020.11.01", "logstash-2020.11.02"]
    );
    assert_eq!(report.evicted, store.deleted());
    assert_eq!(
        store
            .tier_updates()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>(),
        vec!["logstash-2021.02.01", "logstash-2021.02.02"]
    );
}

#[tokio::test]
async fn aborts_when_nothing_to_evict() {
    // Demotions cannot fit and the cold tier is empty: abort without
    // touching the store.
    let store = MockStore::new(vec![MockIndex::hot("logstash-2021.02.01", "100gb")]);

    let report = balancer(store.clone(), limits(10.0, 50.0, 50.0), false)
        .run_pass()
        .await
        .unwrap();

    assert_matches!(report.outcome, PassOutcome::Aborted { .. });
    assert!(store.deleted().is_empty());
    assert!(store.tier_updates().is_empty());
}

#[tokio::test]
async fn aborts_when_eviction_under_satisfies() {
    // Draining the whole cold tier still leaves no room: the deletions are
    // issued but the demotion is abandoned rather than exceeding the limit.
    let store = MockStore::new(vec![
        MockIndex::hot("logstash-2021.02.01", "100gb"),
        MockIndex::cold("logstash-2020.11.01", "20gb"),
    ]);

    let report = balancer(store.clone(), limits(10.0, 50.0, 50.0), false)
        .run_pass()
        .await
        .unwrap();

    assert_matches!(report.outcome, PassOutcome::Aborted { ref reason } => {
        assert!(reason.contains("eviction"), "unexpected reason: {}", reason);
    });
    assert_eq!(store.deleted(), vec!["logstash-2020.11.01"]);
    assert!(store.tier_updates().is_empty());
}

// =============================================================================
// Degradation and Failure
// =============================================================================

#[tokio::test]
async fn store_failure_aborts_the_run() {
    let store = MockStore::failing();

    let result = balancer(store, limits(600.0, 50.0, 1200.0), false)
        .run_pass()
        .await;

    assert_matches!(result, Err(Error::StoreQuery(_)));
}

#[tokio::test]
async fn inconsistent_index_is_skipped() {
    // A huge hot index with no settings metadata is excluded from the
    // snapshot instead of aborting the run, so nothing crosses the limit.
    let mut orphan = MockIndex::hot("logstash-2021.01.01", "900gb");
    orphan.missing_settings = true;

    let store = MockStore::new(vec![
        orphan,
        MockIndex::hot("logstash-2021.01.02", "100gb"),
    ]);

    let report = balancer(store.clone(), limits(600.0, 50.0, 1200.0), false)
        .run_pass()
        .await
        .unwrap();

    assert_eq!(report.outcome, PassOutcome::NoTransferableIndices);
    assert_eq!(report.hot_size_gb, 100.0);
    assert!(store.tier_updates().is_empty());
}

#[tokio::test]
async fn dry_run_issues_no_store_mutations() {
    let store = MockStore::new(vec![
        MockIndex::hot("logstash-2021.02.01", "50gb"),
        MockIndex::hot("logstash-2021.02.02", "50gb"),
        MockIndex::cold("logstash-2020.11.01", "40gb"),
        MockIndex::cold("logstash-2020.11.02", "30gb"),
        MockIndex::cold("logstash-2020.11.03", "1080gb"),
    ]);

    let report = balancer(store.clone(), limits(40.0, 50.0, 1200.0), true)
        .run_pass()
        .await
        .unwrap();

    assert_eq!(report.outcome, PassOutcome::Success);
    // The full plan is reported but nothing reaches the store
    assert_eq!(report.evicted.len(), 2);
    assert_eq!(report.demoted.len(), 2);
    assert!(store.deleted().is_empty());
    assert!(store.tier_updates().is_empty());
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn pass_publishes_audit_events() {
    let store = MockStore::new(vec![
        MockIndex::hot("logstash-2021.02.01", "50gb"),
        MockIndex::hot("logstash-2021.02.02", "50gb"),
        MockIndex::cold("logstash-2020.11.01", "40gb"),
        MockIndex::cold("logstash-2020.11.02", "30gb"),
        MockIndex::cold("logstash-2020.11.03", "1080gb"),
    ]);
    let collector = Arc::new(InMemoryEventCollector::new());

    let balancer = Balancer::new(
        store,
        collector.clone() as Arc<dyn EventPublisher>,
        BalancerConfig {
            index_pattern: "logstash-*".to_string(),
            limits: limits(40.0, 50.0, 1200.0),
            dry_run: false,
        },
    );
    let report = balancer.run_pass().await.unwrap();
    assert_eq!(report.outcome, PassOutcome::Success);

    assert_eq!(collector.events_of_type("SnapshotLoaded").len(), 1);
    assert_eq!(collector.events_of_type("DemotionPlanned").len(), 1);
    assert_eq!(collector.events_of_type("IndexEvicted").len(), 2);
    assert_eq!(collector.events_of_type("IndexDemoted").len(), 2);
    assert_eq!(collector.events_of_type("PassCompleted").len(), 1);
}
