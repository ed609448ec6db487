//! Infrastructure Adapters
//!
//! Concrete implementations of the domain ports:
//!
//! - [`elasticsearch`] - `IndexStore` over the Elasticsearch HTTP API
//! - [`event_publisher`] - `EventPublisher` backed by tracing (and an
//!   in-memory collector for tests)

pub mod elasticsearch;
pub mod event_publisher;

pub use elasticsearch::{ElasticsearchConfig, ElasticsearchStore};
pub use event_publisher::{InMemoryEventCollector, LoggingEventPublisher};
