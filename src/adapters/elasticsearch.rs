//! Elasticsearch Index Store Adapter
//!
//! Implements the `IndexStore` port over the Elasticsearch HTTP API:
//! the JSON cat API for the size listing, the settings API for tier
//! preferences (read and write), and the delete API for eviction.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::ports::{IndexStats, IndexStore, TierPreference, TIER_PREFERENCE_SETTING};
use crate::error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for the Elasticsearch store.
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster.
    pub base_url: String,

    /// Basic-auth username, if the cluster requires authentication.
    pub username: Option<String>,

    /// Basic-auth password.
    pub password: Option<String>,

    /// Per-request timeout. The balancer core enforces none of its own.
    pub request_timeout: Duration,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct CatIndexRow {
    index: String,
    #[serde(rename = "store.size")]
    store_size: Option<String>,
}

// GET /{pattern}/_settings returns a map keyed by index name; the tier
// preference sits under settings.index.routing.allocation.include.
#[derive(Debug, Deserialize)]
struct IndexSettingsEntry {
    settings: SettingsBody,
}

#[derive(Debug, Deserialize)]
struct SettingsBody {
    index: IndexSettings,
}

#[derive(Debug, Deserialize)]
struct IndexSettings {
    #[serde(default)]
    routing: Option<RoutingSettings>,
}

#[derive(Debug, Deserialize)]
struct RoutingSettings {
    #[serde(default)]
    allocation: Option<AllocationSettings>,
}

#[derive(Debug, Deserialize)]
struct AllocationSettings {
    #[serde(default)]
    include: Option<IncludeSettings>,
}

#[derive(Debug, Deserialize)]
struct IncludeSettings {
    #[serde(rename = "_tier_preference")]
    tier_preference: Option<String>,
}

impl IndexSettingsEntry {
    /// Non-destructive walk down to the tier preference.
    fn tier_preference(&self) -> Option<String> {
        self.settings
            .index
            .routing
            .as_ref()
            .and_then(|r| r.allocation.as_ref())
            .and_then(|a| a.include.as_ref())
            .and_then(|i| i.tier_preference.clone())
    }
}

// =============================================================================
// Elasticsearch Store
// =============================================================================

/// Elasticsearch-backed index store.
pub struct ElasticsearchStore {
    config: ElasticsearchConfig,
    client: Client,
    healthy: RwLock<bool>,
}

impl ElasticsearchStore {
    /// Create a new store adapter.
    pub fn new(config: ElasticsearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(Error::StoreConnection)?;

        Ok(Self {
            config,
            client,
            healthy: RwLock::new(true),
        })
    }

    /// Check that the cluster is reachable.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<()> {
        let request = self.authed(self.client.get(&self.config.base_url));
        let response = request.send().await.map_err(|e| {
            *self.healthy.write() = false;
            Error::StoreConnection(e)
        })?;

        if response.status().is_success() {
            *self.healthy.write() = true;
            Ok(())
        } else {
            *self.healthy.write() = false;
            Err(Error::StoreQuery(format!(
                "ping failed: {}",
                response.status()
            )))
        }
    }

    /// Check if the last store interaction succeeded.
    pub fn is_healthy(&self) -> bool {
        *self.healthy.read()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(user) => request.basic_auth(user, self.config.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authed(request).send().await.map_err(|e| {
            *self.healthy.write() = false;
            Error::StoreConnection(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            *self.healthy.write() = false;
            let body = response.text().await.unwrap_or_default();
            return Err(Error::StoreQuery(format!("{}: {}", status, body)));
        }

        *self.healthy.write() = true;
        Ok(response)
    }
}

impl std::fmt::Debug for ElasticsearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchStore")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

#[async_trait]
impl IndexStore for ElasticsearchStore {
    #[instrument(skip(self))]
    async fn list_indices(&self, pattern: &str) -> Result<Vec<IndexStats>> {
        let path = format!(
            "_cat/indices/{}?format=json&s=index",
            urlencoding::encode(pattern)
        );
        let response = self.send(self.client.get(self.url(&path))).await?;

        let rows: Vec<CatIndexRow> = response
            .json()
            .await
            .map_err(|e| Error::StoreResponseParse(e.to_string()))?;

        debug!(count = rows.len(), "listed indices");
        Ok(rows
            .into_iter()
            .map(|row| IndexStats {
                name: row.index,
                size: row.store_size.unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn tier_settings(&self, pattern: &str) -> Result<HashMap<String, Option<String>>> {
        let path = format!("{}/_settings", urlencoding::encode(pattern));
        let response = self.send(self.client.get(self.url(&path))).await?;

        let entries: HashMap<String, IndexSettingsEntry> = response
            .json()
            .await
            .map_err(|e| Error::StoreResponseParse(e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|(name, entry)| {
                let preference = entry.tier_preference();
                (name, preference)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn set_tier_preference(&self, index: &str, tier: TierPreference) -> Result<()> {
        let path = format!("{}/_settings", urlencoding::encode(index));
        let body = serde_json::json!({ TIER_PREFERENCE_SETTING: tier.setting_value() });

        self.send(self.client.put(self.url(&path)).json(&body))
            .await?;
        debug!(index, %tier, "tier preference updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<()> {
        let path = urlencoding::encode(index).into_owned();
        self.send(self.client.delete(self.url(&path))).await?;
        debug!(index, "index deleted");
        Ok(())
    }
}
