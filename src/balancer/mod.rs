//! Tier Balancer Core
//!
//! The decision pipeline of a balance pass:
//!
//! ```text
//! Snapshot Loader → Tier Classifier → { Capacity Accountant,
//!                                       Migration Planner }
//!                                   → Eviction Planner → store mutations
//! ```
//!
//! Everything here is computed fresh per pass from a store snapshot;
//! no component retains state across runs.

pub mod accountant;
pub mod classifier;
pub mod engine;
pub mod eviction;
pub mod migration;
pub mod snapshot;

pub use accountant::{tier_size_bytes, tier_size_gb};
pub use classifier::{classify, TierSnapshot};
pub use engine::{Balancer, BalancerConfig, PassOutcome, PassReport, PassState, PassStep};
pub use eviction::{plan_eviction, would_fit_cold_tier, EvictionPlan};
pub use migration::select_for_demotion;
pub use snapshot::{load_snapshot, IndexRecord};
