//! Coldwarden - Hot/Cold Tier Balancer
//!
//! A periodic control loop that rebalances time-series storage indices
//! across two capacity tiers (hot: fast/expensive, cold: slow/cheap)
//! based on per-index size metadata and configured capacity limits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │   Snapshot   │───▶│   Balancer   │───▶│ Index Store  │
//! │    Loader    │    │   (Brain)    │    │   (Hands)    │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Each invocation recomputes everything from a fresh snapshot: classify
//! indices by tier preference, account aggregate tier sizes, select the
//! oldest hot indices for demotion once the hot tier overflows its limit,
//! and evict the oldest cold indices when the cold tier has no room.
//! Nothing is persisted between runs and no failed call is retried;
//! scheduling and exclusivity belong to an external timer.
//!
//! # Modules
//!
//! - [`adapters`] - Infrastructure adapters implementing domain ports
//! - [`balancer`] - Classification, accounting, planning and the pass engine
//! - [`config`] - Capacity limits
//! - [`domain`] - Index store port, value objects and balance events
//! - [`error`] - Error types
//! - [`size`] - Size string codec

pub mod adapters;
pub mod balancer;
pub mod config;
pub mod domain;
pub mod error;
pub mod size;

// Re-export commonly used types
pub use adapters::{ElasticsearchConfig, ElasticsearchStore, LoggingEventPublisher};
pub use balancer::{Balancer, BalancerConfig, PassOutcome, PassReport};
pub use config::Limits;
pub use domain::{IndexStore, TierPreference};
pub use error::{Error, Result};
