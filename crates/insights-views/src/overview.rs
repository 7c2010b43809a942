use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use insights_models::{percent_delta, percent_of, Lookback, TabularResult, TimeWindow};
use serde::Serialize;
use tracing::info;

use crate::error::ViewError;
use crate::runner::QueryRunner;
use crate::templates::{
    CREDIT_SUMMARY, DAILY_CREDITS, QUERY_SUMMARY, STORAGE_SUMMARY, WAREHOUSE_BREAKDOWN,
    WAREHOUSE_USAGE_SUMMARY,
};

pub const OVERVIEW_LOOKBACKS: [u32; 5] = [7, 14, 30, 60, 90];
pub const DEFAULT_OVERVIEW_LOOKBACK: u32 = 30;

/// Storage is averaged over the last week regardless of the lookback.
const STORAGE_SUMMARY_DAYS: u32 = 7;

/// Account-wide credit, query and storage headline figures.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveOverview {
    pub window: TimeWindow,
    pub previous_window: TimeWindow,
    pub current_credits: f64,
    pub previous_credits: f64,
    /// Change versus the previous window, zero without a positive baseline.
    pub credit_delta_pct: f64,
    pub total_queries: i64,
    pub avg_duration_secs: f64,
    pub storage_tb: f64,
    /// Credits billed for the window, as charted in the credit breakdown.
    pub compute_credits: f64,
    /// Warehouse compute alone, excluding cloud services.
    pub compute_only_credits: f64,
    pub cloud_services_credits: f64,
    pub success_rate_pct: f64,
    pub daily_credits: Arc<TabularResult>,
    pub top_warehouses: Arc<TabularResult>,
    pub warehouse_usage: Arc<TabularResult>,
}

pub async fn executive_overview(
    runner: &QueryRunner,
    lookback: Lookback,
    today: NaiveDate,
) -> Result<ExecutiveOverview, ViewError> {
    let started = Instant::now();
    let window = lookback.window_ending(today)?;
    let previous_window = window.preceding()?;
    let storage_window = TimeWindow::through(today, STORAGE_SUMMARY_DAYS)?;

    let mut credit_params = window.params().to_vec();
    credit_params.extend(previous_window.params());

    let (summary, daily, warehouses, queries, storage, usage) = tokio::try_join!(
        runner.run(&CREDIT_SUMMARY, credit_params),
        runner.run(&DAILY_CREDITS, window.params().into()),
        runner.run(&WAREHOUSE_BREAKDOWN, window.params().into()),
        runner.run(&QUERY_SUMMARY, window.params().into()),
        runner.run(&STORAGE_SUMMARY, storage_window.params().into()),
        runner.run(&WAREHOUSE_USAGE_SUMMARY, window.params().into()),
    )?;

    let current_credits = summary.first_f64("CURRENT_CREDITS");
    let previous_credits = summary.first_f64("PREVIOUS_CREDITS");
    let successful = queries.first_f64("SUCCESSFUL");
    let failed = queries.first_f64("FAILED");

    let overview = ExecutiveOverview {
        window,
        previous_window,
        current_credits,
        previous_credits,
        credit_delta_pct: percent_delta(current_credits, previous_credits),
        total_queries: queries.first_i64("TOTAL_QUERIES"),
        avg_duration_secs: queries.first_f64("AVG_DURATION_SECS"),
        storage_tb: storage.first_f64("TOTAL_TB"),
        compute_credits: daily.sum_f64("CREDITS"),
        compute_only_credits: daily.sum_f64("COMPUTE_CREDITS"),
        cloud_services_credits: daily.sum_f64("CLOUD_SERVICES_CREDITS"),
        success_rate_pct: percent_of(successful, successful + failed),
        daily_credits: daily,
        top_warehouses: warehouses,
        warehouse_usage: usage,
    };

    info!(
        days = lookback.days(),
        window = %overview.window,
        credits = overview.current_credits,
        elapsed_ms = started.elapsed().as_millis(),
        "Loaded executive overview"
    );
    Ok(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_cache::QueryCache;
    use insights_models::{CacheConfig, ParamValue};
    use insights_source::test_support::{CountingExecutor, MockExecutor};
    use insights_source::Statement;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn statement_for<'a>(statements: &'a [Statement], sql: &str) -> &'a Statement {
        statements.iter().find(|s| s.sql == sql).unwrap()
    }

    #[tokio::test]
    async fn binds_current_and_previous_windows() {
        let counting = Arc::new(CountingExecutor::new(MockExecutor::returning(
            TabularResult::empty(vec!["CURRENT_CREDITS".to_string()]),
        )));
        let runner = QueryRunner::new(
            Arc::new(QueryCache::new()),
            counting.clone(),
            CacheConfig::default(),
        );
        let lookback = Lookback::select(30, &OVERVIEW_LOOKBACKS).unwrap();

        let overview = executive_overview(&runner, lookback, date(2024, 3, 31))
            .await
            .unwrap();

        assert_eq!(overview.window.start(), date(2024, 3, 1));
        assert_eq!(overview.previous_window.start(), date(2024, 1, 31));
        assert_eq!(overview.previous_window.end(), overview.window.start());

        let statements = counting.statements();
        assert_eq!(statements.len(), 6);
        let credit = statement_for(&statements, CREDIT_SUMMARY.sql);
        assert_eq!(
            credit.params,
            vec![
                ParamValue::from(date(2024, 3, 1)),
                date(2024, 3, 31).into(),
                date(2024, 1, 31).into(),
                date(2024, 3, 1).into(),
            ]
        );
        let storage = statement_for(&statements, STORAGE_SUMMARY.sql);
        assert_eq!(
            storage.params,
            vec![ParamValue::from(date(2024, 3, 24)), date(2024, 4, 1).into()]
        );
    }

    #[tokio::test]
    async fn empty_period_falls_back_to_zero() {
        let runner = QueryRunner::new(
            Arc::new(QueryCache::new()),
            Arc::new(MockExecutor::returning(TabularResult::empty(vec![]))),
            CacheConfig::default(),
        );
        let lookback = Lookback::select(7, &OVERVIEW_LOOKBACKS).unwrap();

        let overview = executive_overview(&runner, lookback, date(2024, 3, 31))
            .await
            .unwrap();

        assert_eq!(overview.current_credits, 0.0);
        assert_eq!(overview.credit_delta_pct, 0.0);
        assert_eq!(overview.total_queries, 0);
        assert_eq!(overview.success_rate_pct, 0.0);
        assert_eq!(overview.storage_tb, 0.0);
        assert!(overview.daily_credits.is_empty());
    }
}
