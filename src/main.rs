//! Coldwarden - Hot/Cold Tier Balancer
//!
//! One-shot entry point: parse configuration, open the index store
//! connection, run a single balance pass, report a status line. Periodic
//! execution and exclusivity are left to an external scheduler (cron or
//! a systemd timer).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coldwarden::adapters::{ElasticsearchConfig, ElasticsearchStore, LoggingEventPublisher};
use coldwarden::balancer::{Balancer, BalancerConfig, PassOutcome};
use coldwarden::config::Limits;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Coldwarden - hot/cold tier balancer for time-series search indices
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Elasticsearch base URL
    #[arg(long, env = "ELASTIC_HOST", default_value = "http://localhost:9200")]
    elastic_url: String,

    /// Basic-auth username
    #[arg(long, env = "ELASTIC_USER")]
    elastic_user: Option<String>,

    /// Basic-auth password
    #[arg(long, env = "ELASTIC_PASSWORD", hide_env_values = true)]
    elastic_password: Option<String>,

    /// Name pattern selecting the indices under management
    #[arg(long, env = "INDEX_PATTERN", default_value = "logstash-*")]
    index_pattern: String,

    /// Capacity trigger for starting demotion from hot, in GB
    #[arg(long, env = "HOT_INDEX_SIZE_LIMIT_GB", default_value = "600.0")]
    hot_index_size_limit_gb: f64,

    /// Minimum overflow beyond the hot limit before demotion happens, in GB
    #[arg(long, env = "HOT_OVERFLOW_MARGIN_GB", default_value = "50.0")]
    hot_overflow_margin_gb: f64,

    /// Capacity ceiling for the cold tier, in GB
    #[arg(long, env = "COLD_TIER_SIZE_LIMIT_GB", default_value = "1200.0")]
    cold_tier_size_limit_gb: f64,

    /// YAML file with capacity limits; overrides the individual limit flags
    #[arg(long, env = "LIMITS_FILE")]
    limits_file: Option<PathBuf>,

    /// Store request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value = "30")]
    request_timeout_seconds: u64,

    /// Enable dry-run mode (log only, no store mutations)
    #[arg(long, env = "DRY_RUN")]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn limits(&self) -> anyhow::Result<Limits> {
        let limits = match &self.limits_file {
            Some(path) => Limits::from_yaml_file(path)
                .with_context(|| format!("loading limits file {}", path.display()))?,
            None => {
                let limits = Limits {
                    hot_index_size_limit_gb: self.hot_index_size_limit_gb,
                    hot_overflow_margin_gb: self.hot_overflow_margin_gb,
                    cold_tier_size_limit_gb: self.cold_tier_size_limit_gb,
                };
                limits.validate()?;
                limits
            }
        };
        Ok(limits)
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let limits = args.limits()?;

    info!("Starting tier balance pass");
    info!("  Store URL: {}", args.elastic_url);
    info!("  Index pattern: {}", args.index_pattern);
    info!("  Hot limit: {} GB", limits.hot_index_size_limit_gb);
    info!("  Hot overflow margin: {} GB", limits.hot_overflow_margin_gb);
    info!("  Cold limit: {} GB", limits.cold_tier_size_limit_gb);
    info!("  Dry-run mode: {}", args.dry_run);

    let store = ElasticsearchStore::new(ElasticsearchConfig {
        base_url: args.elastic_url.clone(),
        username: args.elastic_user.clone(),
        password: args.elastic_password.clone(),
        request_timeout: Duration::from_secs(args.request_timeout_seconds),
    })
    .context("creating index store client")?;

    store
        .ping()
        .await
        .context("index store is not reachable")?;
    info!("Connected to index store");

    let balancer = Balancer::new(
        Arc::new(store),
        Arc::new(LoggingEventPublisher::info_level()),
        BalancerConfig {
            index_pattern: args.index_pattern.clone(),
            limits,
            dry_run: args.dry_run,
        },
    );

    let report = balancer.run_pass().await.context("balance pass failed")?;

    match &report.outcome {
        PassOutcome::Success => {
            info!(
                "Balance pass complete: {} ({} demoted, {} evicted)",
                report.outcome,
                report.demoted.len(),
                report.evicted.len()
            );
        }
        PassOutcome::NoTransferableIndices => {
            info!("Balance pass complete: {}", report.outcome);
        }
        PassOutcome::Aborted { .. } => {
            error!("Balance pass {}", report.outcome);
            anyhow::bail!("balance pass {}", report.outcome);
        }
    }

    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
