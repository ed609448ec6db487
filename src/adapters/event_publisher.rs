//! Event Publisher Adapters
//!
//! Implements the `EventPublisher` port with logging and in-memory
//! backends.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::events::{BalanceEvent, EventPublisher};
use crate::error::Result;

/// Logging-based event publisher.
///
/// Publishes balance events to the tracing/logging system, which is the
/// audit trail for a one-shot pass.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventPublisher {
    /// Whether to log events at info level (true) or debug level (false)
    info_level: bool,
}

impl LoggingEventPublisher {
    /// Create a publisher that logs at info level.
    pub fn info_level() -> Self {
        Self { info_level: true }
    }

    /// Create a publisher that logs at debug level.
    pub fn debug_level() -> Self {
        Self { info_level: false }
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, event: BalanceEvent) -> Result<()> {
        let event_type = event.event_type();
        let json = serde_json::to_string(&event).unwrap_or_else(|_| format!("{:?}", event));

        if self.info_level {
            info!(event_type = %event_type, event = %json, "balance event");
        } else {
            debug!(event_type = %event_type, event = %json, "balance event");
        }

        Ok(())
    }
}

/// In-memory event collector for testing.
#[derive(Debug, Default)]
pub struct InMemoryEventCollector {
    events: parking_lot::RwLock<Vec<BalanceEvent>>,
}

impl InMemoryEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected events.
    pub fn events(&self) -> Vec<BalanceEvent> {
        self.events.read().clone()
    }

    /// Get events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<BalanceEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventCollector {
    async fn publish(&self, event: BalanceEvent) -> Result<()> {
        self.events.write().push(event);
        Ok(())
    }
}
