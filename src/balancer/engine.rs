//! Balancer Engine - "The Brain and Hands"
//!
//! Sequences one tier balance pass: load a fresh snapshot, classify it,
//! plan demotions, make room in the cold tier if needed, then issue the
//! tier-setting updates. Single pass, no persistence; every store call is
//! awaited before the next step and nothing is retried.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::balancer::accountant::tier_size_gb;
use crate::balancer::classifier::classify;
use crate::balancer::eviction::{plan_eviction, would_fit_cold_tier};
use crate::balancer::migration::select_for_demotion;
use crate::balancer::snapshot::load_snapshot;
use crate::config::Limits;
use crate::domain::events::{BalanceEvent, EventPublisher};
use crate::domain::ports::{IndexStore, TierPreference};
use crate::error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the balancer engine.
#[derive(Debug, Clone)]
pub struct BalancerConfig {
    /// Name pattern selecting the indices under management.
    pub index_pattern: String,

    /// Capacity limits for both tiers.
    pub limits: Limits,

    /// Dry-run mode (log only, no store mutations).
    pub dry_run: bool,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            index_pattern: "logstash-*".to_string(),
            limits: Limits::default(),
            dry_run: false,
        }
    }
}

// =============================================================================
// Pass State Machine
// =============================================================================

/// States a balance pass moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassState {
    /// Loading the index snapshot
    Loading,
    /// Snapshot partitioned into hot and cold
    Classified,
    /// Selecting demotion candidates
    PlanningMigration,
    /// Checking cold tier capacity
    CheckingColdCapacity,
    /// Deleting cold indices to make room
    Evicting,
    /// Issuing tier-setting updates
    Migrating,
    /// Pass finished
    Done,
}

impl std::fmt::Display for PassState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassState::Loading => write!(f, "Loading"),
            PassState::Classified => write!(f, "Classified"),
            PassState::PlanningMigration => write!(f, "PlanningMigration"),
            PassState::CheckingColdCapacity => write!(f, "CheckingColdCapacity"),
            PassState::Evicting => write!(f, "Evicting"),
            PassState::Migrating => write!(f, "Migrating"),
            PassState::Done => write!(f, "Done"),
        }
    }
}

/// A step in the balance pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassStep {
    pub state: PassState,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub duration_ms: Option<u64>,
}

/// Terminal outcome of a balance pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PassOutcome {
    /// Demotions were issued (or planned, in dry-run mode).
    Success,
    /// The hot tier never crossed its threshold; nothing to do.
    NoTransferableIndices,
    /// The pass gave up without demoting anything.
    Aborted { reason: String },
}

impl std::fmt::Display for PassOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassOutcome::Success => write!(f, "success"),
            PassOutcome::NoTransferableIndices => write!(f, "no transferable indices"),
            PassOutcome::Aborted { reason } => write!(f, "aborted: {}", reason),
        }
    }
}

/// Result of one balance pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Unique id for correlating log lines of this pass.
    pub pass_id: Uuid,

    /// Terminal outcome.
    pub outcome: PassOutcome,

    /// Names of indices whose tier preference was set to cold.
    pub demoted: Vec<String>,

    /// Names of cold indices deleted to make room, in removal order.
    pub evicted: Vec<String>,

    /// Aggregate hot tier size at snapshot time.
    pub hot_size_gb: f64,

    /// Aggregate cold tier size at snapshot time.
    pub cold_size_gb: f64,

    /// When the pass started.
    pub start_time: DateTime<Utc>,

    /// When the pass ended.
    pub end_time: DateTime<Utc>,

    /// Step-by-step log.
    pub steps: Vec<PassStep>,
}

impl PassReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            pass_id: Uuid::new_v4(),
            outcome: PassOutcome::Aborted {
                reason: "pass did not complete".to_string(),
            },
            demoted: vec![],
            evicted: vec![],
            hot_size_gb: 0.0,
            cold_size_gb: 0.0,
            start_time: now,
            end_time: now,
            steps: vec![],
        }
    }

    /// Record a state transition.
    fn transition(&mut self, state: PassState, message: impl Into<String>) {
        let now = Utc::now();
        let last_step_time = self
            .steps
            .last()
            .map(|s| s.timestamp)
            .unwrap_or(self.start_time);
        let duration_ms = (now - last_step_time).num_milliseconds().max(0) as u64;

        self.steps.push(PassStep {
            state,
            timestamp: now,
            message: message.into(),
            duration_ms: Some(duration_ms),
        });
        self.end_time = now;
    }

    /// Record the terminal outcome.
    fn finish(&mut self, outcome: PassOutcome, message: impl Into<String>) {
        self.transition(PassState::Done, message);
        self.outcome = outcome;
    }

    /// Check if the pass issued (or planned) demotions.
    pub fn is_success(&self) -> bool {
        self.outcome == PassOutcome::Success
    }

    /// Total pass duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        (self.end_time - self.start_time).num_milliseconds().max(0) as u64
    }
}

// =============================================================================
// Balancer
// =============================================================================

/// Runs tier balance passes against an index store.
pub struct Balancer {
    store: Arc<dyn IndexStore>,
    events: Arc<dyn EventPublisher>,
    config: BalancerConfig,
}

impl Balancer {
    /// Create a new balancer.
    pub fn new(
        store: Arc<dyn IndexStore>,
        events: Arc<dyn EventPublisher>,
        config: BalancerConfig,
    ) -> Self {
        Self {
            store,
            events,
            config,
        }
    }

    /// Run one balance pass.
    ///
    /// Store connectivity errors propagate and abort the remaining
    /// sequence; planning dead-ends (nothing to demote, cold tier cannot
    /// be shrunk) are reported in the returned outcome instead.
    #[instrument(skip(self), fields(pattern = %self.config.index_pattern, dry_run = self.config.dry_run))]
    pub async fn run_pass(&self) -> Result<PassReport> {
        let limits = &self.config.limits;
        let mut report = PassReport::new();

        report.transition(PassState::Loading, "loading index snapshot");
        let records = load_snapshot(self.store.as_ref(), &self.config.index_pattern).await?;

        let snapshot = classify(records);
        let hot_gb = tier_size_gb(&snapshot.hot);
        let cold_gb = tier_size_gb(&snapshot.cold);
        report.hot_size_gb = hot_gb;
        report.cold_size_gb = cold_gb;
        report.transition(
            PassState::Classified,
            format!(
                "{} hot indices ({:.1} GB), {} cold indices ({:.1} GB)",
                snapshot.hot.len(),
                hot_gb,
                snapshot.cold.len(),
                cold_gb
            ),
        );
        self.events
            .publish(BalanceEvent::snapshot_loaded(
                snapshot.len(),
                snapshot.hot.len(),
                snapshot.cold.len(),
            ))
            .await?;

        report.transition(PassState::PlanningMigration, "selecting demotion candidates");
        let candidates = select_for_demotion(&snapshot.hot, limits);
        if candidates.is_empty() {
            info!("no transferable indices");
            report.finish(
                PassOutcome::NoTransferableIndices,
                "hot tier within limits",
            );
            self.publish_completed(&report).await?;
            return Ok(report);
        }

        let candidate_gb = tier_size_gb(candidates);
        let candidate_names: Vec<String> = candidates.iter().map(|r| r.name.clone()).collect();
        info!(
            count = candidates.len(),
            "selected {:.1} GB of demotion candidates",
            candidate_gb
        );
        self.events
            .publish(BalanceEvent::demotion_planned(
                candidate_names,
                candidate_gb,
            ))
            .await?;

        report.transition(
            PassState::CheckingColdCapacity,
            format!(
                "{:.1} GB incoming, {:.1} GB cold of {:.1} GB limit",
                candidate_gb, cold_gb, limits.cold_tier_size_limit_gb
            ),
        );
        if !would_fit_cold_tier(cold_gb, candidate_gb, limits) {
            let excess_gb = (cold_gb + candidate_gb) - limits.cold_tier_size_limit_gb;
            report.transition(
                PassState::Evicting,
                format!("cold tier over budget by {:.1} GB", excess_gb),
            );

            let plan = plan_eviction(&snapshot.cold, excess_gb);
            if plan.evicted.is_empty() {
                let cause = Error::EvictionInsufficient {
                    needed_gb: excess_gb,
                    freed_gb: 0.0,
                };
                warn!("no cold indices eligible for eviction, aborting migration");
                report.finish(
                    PassOutcome::Aborted {
                        reason: cause.to_string(),
                    },
                    "nothing to evict",
                );
                self.publish_completed(&report).await?;
                return Ok(report);
            }

            for record in &plan.evicted {
                if self.config.dry_run {
                    info!("[DRY-RUN] would delete index {}", record.name);
                } else {
                    self.store.delete_index(&record.name).await?;
                    self.events
                        .publish(BalanceEvent::index_evicted(&record.name, record.size_bytes))
                        .await?;
                }
                report.evicted.push(record.name.clone());
            }
            info!(
                "evicted {} oldest cold indices, freed {:.1} GB",
                plan.evicted.len(),
                plan.freed_gb()
            );

            // Re-check against the surviving cold list; eviction may have
            // under-satisfied the target.
            let remaining_gb = tier_size_gb(&plan.remaining);
            if !would_fit_cold_tier(remaining_gb, candidate_gb, limits) {
                let cause = Error::EvictionInsufficient {
                    needed_gb: excess_gb,
                    freed_gb: plan.freed_gb(),
                };
                warn!("{}, aborting migration", cause);
                report.finish(
                    PassOutcome::Aborted {
                        reason: cause.to_string(),
                    },
                    "cold tier still over budget after eviction",
                );
                self.publish_completed(&report).await?;
                return Ok(report);
            }
        }

        report.transition(
            PassState::Migrating,
            format!(
                "demoting {} indices ({:.1} GB) to cold",
                candidates.len(),
                candidate_gb
            ),
        );
        for record in candidates {
            if self.config.dry_run {
                info!("[DRY-RUN] would set {} to cold tier", record.name);
            } else {
                self.store
                    .set_tier_preference(&record.name, TierPreference::Cold)
                    .await?;
                self.events
                    .publish(BalanceEvent::index_demoted(&record.name))
                    .await?;
            }
            report.demoted.push(record.name.clone());
        }

        info!(demoted = report.demoted.len(), "balance pass succeeded");
        report.finish(PassOutcome::Success, "demotions issued");
        self.publish_completed(&report).await?;
        Ok(report)
    }

    async fn publish_completed(&self, report: &PassReport) -> Result<()> {
        self.events
            .publish(BalanceEvent::pass_completed(
                report.outcome.to_string(),
                report.duration_ms(),
            ))
            .await
    }
}
