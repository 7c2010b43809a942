use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use insights_models::{percent_delta, TabularResult, TimeWindow};
use serde::Serialize;
use tracing::info;

use crate::error::ViewError;
use crate::runner::QueryRunner;
use crate::templates::{
    DATABASE_GROWTH, DATABASE_STORAGE, STORAGE_BY_TYPE, STORAGE_OVERVIEW, STORAGE_TABLES,
};

pub const STORAGE_TREND_DAYS: u32 = 90;
pub const DATABASE_HISTORY_DAYS: u32 = 30;

const DATABASES_SHOWN: usize = 10;
const GROWTH_DATABASES: usize = 5;
const TIME_TRAVEL_THRESHOLD_GB: f64 = 0.1;

/// Latest-day split of account storage, in TB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageBreakdown {
    pub database_tb: f64,
    pub stage_tb: f64,
    pub failsafe_tb: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageAnalysis {
    pub trend_window: TimeWindow,
    pub database_window: TimeWindow,
    pub total_tb: f64,
    pub database_tb: f64,
    pub stage_tb: f64,
    /// Change in total storage across the trend window.
    pub growth_tb: f64,
    pub growth_pct: f64,
    pub trend: Arc<TabularResult>,
    pub by_database: TabularResult,
    pub breakdown: StorageBreakdown,
    /// Daily history of the largest databases only.
    pub database_growth: TabularResult,
    /// Databases that own at least one of the largest tables.
    pub table_databases: Vec<String>,
    pub tables: TabularResult,
    pub time_travel: TabularResult,
}

/// Storage trend and breakdowns up to and including `today`.
///
/// `database` narrows the largest-tables listing; an unknown name leaves it
/// empty. Time-travel analysis always covers every listed table.
pub async fn storage_analysis(
    runner: &QueryRunner,
    today: NaiveDate,
    database: Option<&str>,
) -> Result<StorageAnalysis, ViewError> {
    let started = Instant::now();
    let trend_window = TimeWindow::through(today, STORAGE_TREND_DAYS)?;
    let database_window = TimeWindow::through(today, DATABASE_HISTORY_DAYS)?;

    let (trend, db_storage, db_growth, tables, by_type) = tokio::try_join!(
        runner.run(&STORAGE_OVERVIEW, trend_window.params().into()),
        runner.run(&DATABASE_STORAGE, database_window.params().into()),
        runner.run(&DATABASE_GROWTH, database_window.params().into()),
        runner.run(&STORAGE_TABLES, Vec::new()),
        runner.run(&STORAGE_BY_TYPE, Vec::new()),
    )?;

    let earliest = trend.first_f64("TOTAL_TB");
    let latest = trend.last_f64("TOTAL_TB");

    let top: Vec<String> = db_storage
        .head(GROWTH_DATABASES)
        .distinct_text("DATABASE_NAME");
    let database_growth = db_growth.filter_rows("DATABASE_NAME", |v| {
        v.as_str().is_some_and(|name| top.iter().any(|t| t == name))
    });

    let filtered_tables = match database {
        Some(db) => tables.filter_rows("DATABASE_NAME", |v| v.as_str() == Some(db)),
        None => (*tables).clone(),
    };
    let time_travel = tables
        .filter_rows("TIME_TRAVEL_GB", |v| {
            v.as_f64().is_some_and(|gb| gb > TIME_TRAVEL_THRESHOLD_GB)
        })
        .sorted_desc_by("TIME_TRAVEL_GB");

    let analysis = StorageAnalysis {
        trend_window,
        database_window,
        total_tb: latest,
        database_tb: trend.last_f64("STORAGE_TB"),
        stage_tb: trend.last_f64("STAGE_TB"),
        growth_tb: latest - earliest,
        growth_pct: percent_delta(latest, earliest),
        trend,
        by_database: db_storage.head(DATABASES_SHOWN),
        breakdown: StorageBreakdown {
            database_tb: by_type.first_f64("DATABASE_TB"),
            stage_tb: by_type.first_f64("STAGE_TB"),
            failsafe_tb: by_type.first_f64("FAILSAFE_TB"),
        },
        database_growth,
        table_databases: tables.distinct_text("DATABASE_NAME"),
        tables: filtered_tables,
        time_travel,
    };

    info!(
        total_tb = analysis.total_tb,
        growth_pct = analysis.growth_pct,
        database = database.unwrap_or("all"),
        elapsed_ms = started.elapsed().as_millis(),
        "Loaded storage analysis"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_cache::QueryCache;
    use insights_models::{CacheConfig, ParamValue};
    use insights_source::test_support::{CountingExecutor, MockExecutor};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn windows_run_through_today() {
        let counting = Arc::new(CountingExecutor::new(MockExecutor::returning(
            TabularResult::empty(vec!["TOTAL_TB".to_string()]),
        )));
        let runner = QueryRunner::new(
            Arc::new(QueryCache::new()),
            counting.clone(),
            CacheConfig::default(),
        );

        let analysis = storage_analysis(&runner, date(2024, 4, 30), None)
            .await
            .unwrap();

        assert_eq!(analysis.trend_window.start(), date(2024, 1, 31));
        assert_eq!(analysis.trend_window.end(), date(2024, 5, 1));
        assert_eq!(analysis.database_window.start(), date(2024, 3, 31));
        assert_eq!(analysis.growth_tb, 0.0);
        assert_eq!(analysis.growth_pct, 0.0);
        assert!(analysis.time_travel.is_empty());

        let trend = counting
            .statements()
            .into_iter()
            .find(|s| s.sql == STORAGE_OVERVIEW.sql)
            .unwrap();
        assert_eq!(
            trend.params,
            vec![ParamValue::from(date(2024, 1, 31)), date(2024, 5, 1).into()]
        );
    }
}
