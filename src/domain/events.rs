//! Domain Events
//!
//! Immutable records of significant occurrences during a balance pass,
//! used for audit logging and for decoupling the engine from its
//! reporting backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Domain event emitted during a balance pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BalanceEvent {
    /// A fresh snapshot was loaded and classified.
    SnapshotLoaded {
        total: usize,
        hot: usize,
        cold: usize,
        timestamp: DateTime<Utc>,
    },

    /// Hot indices were selected for demotion to cold.
    DemotionPlanned {
        indices: Vec<String>,
        size_gb: f64,
        timestamp: DateTime<Utc>,
    },

    /// A cold index was deleted to free capacity.
    IndexEvicted {
        index: String,
        size_bytes: u64,
        timestamp: DateTime<Utc>,
    },

    /// A hot index's tier preference was set to cold.
    IndexDemoted {
        index: String,
        timestamp: DateTime<Utc>,
    },

    /// The pass finished.
    PassCompleted {
        outcome: String,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl BalanceEvent {
    /// Short event-type label for filtering and log fields.
    pub fn event_type(&self) -> &'static str {
        match self {
            BalanceEvent::SnapshotLoaded { .. } => "SnapshotLoaded",
            BalanceEvent::DemotionPlanned { .. } => "DemotionPlanned",
            BalanceEvent::IndexEvicted { .. } => "IndexEvicted",
            BalanceEvent::IndexDemoted { .. } => "IndexDemoted",
            BalanceEvent::PassCompleted { .. } => "PassCompleted",
        }
    }

    pub fn snapshot_loaded(total: usize, hot: usize, cold: usize) -> Self {
        BalanceEvent::SnapshotLoaded {
            total,
            hot,
            cold,
            timestamp: Utc::now(),
        }
    }

    pub fn demotion_planned(indices: Vec<String>, size_gb: f64) -> Self {
        BalanceEvent::DemotionPlanned {
            indices,
            size_gb,
            timestamp: Utc::now(),
        }
    }

    pub fn index_evicted(index: impl Into<String>, size_bytes: u64) -> Self {
        BalanceEvent::IndexEvicted {
            index: index.into(),
            size_bytes,
            timestamp: Utc::now(),
        }
    }

    pub fn index_demoted(index: impl Into<String>) -> Self {
        BalanceEvent::IndexDemoted {
            index: index.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn pass_completed(outcome: impl Into<String>, duration_ms: u64) -> Self {
        BalanceEvent::PassCompleted {
            outcome: outcome.into(),
            duration_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Port for publishing balance events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: BalanceEvent) -> Result<()>;
}
