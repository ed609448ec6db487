//! Domain Layer
//!
//! Ports and events the balancer core depends on:
//!
//! - **Ports** (`ports.rs`) - the index store abstraction and its value objects
//! - **Events** (`events.rs`) - balance events for audit and decoupling

pub mod events;
pub mod ports;

pub use events::{BalanceEvent, EventPublisher};
pub use ports::{IndexStats, IndexStore, TierPreference, TIER_PREFERENCE_SETTING};
