//! Usage Insights - cost and performance views over warehouse account-usage data.
//!
//! Each view derives a time window, runs parameterized statements against a
//! SQLite replica of the account-usage views, and memoizes every result for a
//! bounded time in a shared query cache.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use usage_insights::models::{InsightsConfig, Lookback};
//! use usage_insights::views::overview::{executive_overview, OVERVIEW_LOOKBACKS};
//! use usage_insights::{build_runner, render, View};
//! ```

pub use insights_cache as cache;
pub use insights_models as models;
pub use insights_source as source;
pub use insights_views as views;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use insights_cache::QueryCache;
use insights_models::{InsightsConfig, Lookback};
use insights_source::{SqliteSource, TimeoutExecutor};
use insights_views::overview::{DEFAULT_OVERVIEW_LOOKBACK, OVERVIEW_LOOKBACKS};
use insights_views::query_performance::{
    DEFAULT_QUERY_LOOKBACK, DEFAULT_SLOW_THRESHOLD_SECS, QUERY_LOOKBACKS,
};
use insights_views::templates;
use insights_views::warehouse::{DEFAULT_WAREHOUSE_LOOKBACK, WAREHOUSE_LOOKBACKS};
use insights_views::{
    executive_overview, query_performance, storage_analysis, warehouse_analysis,
    warehouse_names, QueryRunner, SlowThreshold,
};
use tracing::warn;

/// A report to render, with its parameters.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum View {
    /// Credits, queries and storage across the account
    Overview {
        #[arg(long, default_value_t = DEFAULT_OVERVIEW_LOOKBACK)]
        days: u32,
    },
    /// Warehouses with metering activity in the lookback window
    Warehouses {
        #[arg(long, default_value_t = DEFAULT_WAREHOUSE_LOOKBACK)]
        days: u32,
    },
    /// Detail for one warehouse (the first active one if --name is omitted)
    Warehouse {
        #[arg(long, default_value_t = DEFAULT_WAREHOUSE_LOOKBACK)]
        days: u32,
        #[arg(long)]
        name: Option<String>,
    },
    /// Query volume, failures and the slowest and most expensive queries
    Queries {
        #[arg(long, default_value_t = DEFAULT_QUERY_LOOKBACK)]
        days: u32,
        /// Slow-query threshold in seconds
        #[arg(long, default_value_t = DEFAULT_SLOW_THRESHOLD_SECS)]
        threshold: u32,
    },
    /// Storage trend, databases and largest tables
    Storage {
        /// Only list tables in this database
        #[arg(long)]
        database: Option<String>,
    },
    /// Every view with its default parameters, keyed by view name
    All,
}

/// Read and validate a TOML configuration file.
pub fn load_config(path: &str) -> Result<InsightsConfig, anyhow::Error> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {path}"))?;
    let config: InsightsConfig = toml::from_str(&raw).context("Failed to parse config")?;
    config.validate().context("Invalid config")?;
    Ok(config)
}

/// Build a QueryRunner over the configured SQLite replica.
pub fn build_runner(config: &InsightsConfig) -> Result<QueryRunner, anyhow::Error> {
    config.validate()?;
    templates::check_ttl_overrides(&config.cache)?;
    let sqlite = SqliteSource::open(&config.source.sqlite_path)
        .with_context(|| format!("Failed to open replica: {}", config.source.sqlite_path))?;
    let executor = TimeoutExecutor::new(
        sqlite,
        Duration::from_secs(config.source.timeout_seconds),
    );
    let cache = Arc::new(QueryCache::from_config(&config.cache));

    Ok(QueryRunner::new(
        cache,
        Arc::new(executor),
        config.cache.clone(),
    ))
}

/// Render one view as JSON. Results come from and go to the runner's cache.
pub async fn render(
    runner: &QueryRunner,
    view: &View,
    today: NaiveDate,
) -> Result<serde_json::Value, anyhow::Error> {
    let report = match view {
        View::Overview { days } => {
            let lookback = Lookback::select(*days, &OVERVIEW_LOOKBACKS)?;
            serde_json::to_value(executive_overview(runner, lookback, today).await?)?
        }
        View::Warehouses { days } => {
            let window = Lookback::select(*days, &WAREHOUSE_LOOKBACKS)?.window_ending(today)?;
            serde_json::to_value(warehouse_names(runner, window).await?)?
        }
        View::Warehouse { days, name } => {
            let lookback = Lookback::select(*days, &WAREHOUSE_LOOKBACKS)?;
            let analysis = warehouse_analysis(runner, lookback, today, name.as_deref()).await?;
            if analysis.is_none() {
                warn!(days, "No warehouses found for the selected period");
            }
            serde_json::to_value(analysis)?
        }
        View::Queries { days, threshold } => {
            let lookback = Lookback::select(*days, &QUERY_LOOKBACKS)?;
            let threshold = SlowThreshold::new(*threshold)?;
            serde_json::to_value(query_performance(runner, lookback, today, threshold).await?)?
        }
        View::Storage { database } => {
            serde_json::to_value(storage_analysis(runner, today, database.as_deref()).await?)?
        }
        View::All => {
            let overview = Lookback::select(DEFAULT_OVERVIEW_LOOKBACK, &OVERVIEW_LOOKBACKS)?;
            let warehouse = Lookback::select(DEFAULT_WAREHOUSE_LOOKBACK, &WAREHOUSE_LOOKBACKS)?;
            let queries = Lookback::select(DEFAULT_QUERY_LOOKBACK, &QUERY_LOOKBACKS)?;
            let (overview, warehouse, queries, storage) = tokio::try_join!(
                executive_overview(runner, overview, today),
                warehouse_analysis(runner, warehouse, today, None),
                query_performance(runner, queries, today, SlowThreshold::default()),
                storage_analysis(runner, today, None),
            )?;
            let mut all = serde_json::Map::new();
            all.insert("overview".to_string(), serde_json::to_value(overview)?);
            all.insert("warehouse".to_string(), serde_json::to_value(warehouse)?);
            all.insert("queries".to_string(), serde_json::to_value(queries)?);
            all.insert("storage".to_string(), serde_json::to_value(storage)?);
            serde_json::Value::Object(all)
        }
    };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_models::{CacheConfig, SourceConfig};

    fn write_config(dir: &tempfile::TempDir, body: &str) -> String {
        let path = dir.path().join("usage-insights.toml");
        std::fs::write(&path, body).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn load_config_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[source]\nsqlite_path = \"usage.db\"\n");

        let config = load_config(&path).unwrap();
        assert_eq!(config.source.timeout_seconds, 120);
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert!(!config.cache.single_flight);
    }

    #[test]
    fn load_config_rejects_zero_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[source]\nsqlite_path = \"usage.db\"\n[cache]\nttl_seconds = 0\n",
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = load_config("/nonexistent/usage-insights.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn missing_replica_is_an_error() {
        let config = InsightsConfig {
            source: SourceConfig {
                sqlite_path: "/nonexistent/usage.db".to_string(),
                ..SourceConfig::default()
            },
            cache: CacheConfig::default(),
        };
        assert!(build_runner(&config).is_err());
    }

    fn seeded_runner(dir: &tempfile::TempDir) -> QueryRunner {
        let db = dir.path().join("usage.db");
        let db = db.to_str().unwrap();
        let seed = SqliteSource::create(db).unwrap();
        seed.execute_batch(
            "INSERT INTO WAREHOUSE_METERING_HISTORY (START_TIME, END_TIME, WAREHOUSE_NAME, CREDITS_USED) \
             VALUES ('2024-03-10 10:00:00', '2024-03-10 11:00:00', 'ETL_WH', 3.0);",
        )
        .unwrap();
        drop(seed);

        let path = write_config(dir, &format!("[source]\nsqlite_path = \"{db}\"\n"));
        build_runner(&load_config(&path).unwrap()).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn unknown_ttl_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[source]\nsqlite_path = \"usage.db\"\n[cache.template_ttl_seconds]\nno_such_view = 60\n",
        );
        let err = build_runner(&load_config(&path).unwrap()).err().unwrap();
        assert!(err.to_string().contains("no_such_view"));
    }

    #[tokio::test]
    async fn runner_over_file_replica() {
        let dir = tempfile::tempdir().unwrap();
        let runner = seeded_runner(&dir);

        let lookback = Lookback::select(7, &OVERVIEW_LOOKBACKS).unwrap();
        let overview = executive_overview(&runner, lookback, today()).await.unwrap();
        assert_eq!(overview.current_credits, 3.0);
    }

    #[tokio::test]
    async fn second_render_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let runner = seeded_runner(&dir);
        let view = View::Overview { days: 7 };

        let first = render(&runner, &view, today()).await.unwrap();
        let cold = runner.stats();
        assert_eq!(cold.hits, 0);
        assert!(cold.misses > 0);

        let second = render(&runner, &view, today()).await.unwrap();
        let warm = runner.stats();
        assert_eq!(warm.misses, cold.misses);
        assert_eq!(warm.hits, cold.misses);
        assert_eq!(first, second);
        assert_eq!(second["current_credits"], 3.0);
    }

    #[tokio::test]
    async fn all_view_renders_every_report() {
        let dir = tempfile::tempdir().unwrap();
        let runner = seeded_runner(&dir);

        let report = render(&runner, &View::All, today()).await.unwrap();
        assert_eq!(report["overview"]["current_credits"], 3.0);
        assert_eq!(report["warehouse"]["warehouse"], "ETL_WH");
        assert_eq!(report["queries"]["total_queries"], 0);
        assert!(report["storage"].is_object());

        let misses = runner.stats().misses;
        render(&runner, &View::Warehouse { days: 7, name: None }, today())
            .await
            .unwrap();
        assert_eq!(runner.stats().misses, misses);
    }

    #[tokio::test]
    async fn out_of_range_threshold_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let runner = seeded_runner(&dir);
        let view = View::Queries {
            days: 7,
            threshold: 5,
        };
        assert!(render(&runner, &view, today()).await.is_err());
    }
}
