use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use insights_models::{percent_of, Lookback, ParamValue, TabularResult, TimeWindow};
use serde::Serialize;
use tracing::info;

use crate::error::ViewError;
use crate::runner::QueryRunner;
use crate::templates::{
    DAILY_QUERY_VOLUME, EXPENSIVE_QUERIES, FAILED_QUERIES, QUERIES_BY_TYPE, QUERIES_BY_WAREHOUSE,
    QUERY_METRICS, SLOW_QUERIES,
};

pub const QUERY_LOOKBACKS: [u32; 3] = [7, 14, 30];
pub const DEFAULT_QUERY_LOOKBACK: u32 = 7;

pub const MIN_SLOW_THRESHOLD_SECS: u32 = 10;
pub const MAX_SLOW_THRESHOLD_SECS: u32 = 300;
pub const DEFAULT_SLOW_THRESHOLD_SECS: u32 = 60;

const QUERY_TYPES_SHOWN: usize = 10;

/// Elapsed-time cutoff for the slow-query list, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlowThreshold(u32);

impl SlowThreshold {
    pub fn new(secs: u32) -> Result<Self, ViewError> {
        if (MIN_SLOW_THRESHOLD_SECS..=MAX_SLOW_THRESHOLD_SECS).contains(&secs) {
            Ok(Self(secs))
        } else {
            Err(ViewError::InvalidThreshold {
                secs,
                min: MIN_SLOW_THRESHOLD_SECS,
                max: MAX_SLOW_THRESHOLD_SECS,
            })
        }
    }

    pub fn secs(&self) -> u32 {
        self.0
    }
}

impl Default for SlowThreshold {
    fn default() -> Self {
        Self(DEFAULT_SLOW_THRESHOLD_SECS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorTypeCount {
    pub error_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryPerformance {
    pub window: TimeWindow,
    pub threshold: SlowThreshold,
    pub total_queries: i64,
    pub successful: i64,
    pub failed: i64,
    pub success_rate_pct: f64,
    pub avg_duration_secs: f64,
    pub max_duration_secs: f64,
    pub tb_scanned: f64,
    pub daily_volume: Arc<TabularResult>,
    pub by_type: TabularResult,
    pub by_warehouse: Arc<TabularResult>,
    pub expensive: Arc<TabularResult>,
    pub slow: Arc<TabularResult>,
    pub failed_queries: Arc<TabularResult>,
    /// Failed queries in the listing grouped by error type, largest first.
    pub failures_by_type: Vec<ErrorTypeCount>,
}

pub async fn query_performance(
    runner: &QueryRunner,
    lookback: Lookback,
    today: NaiveDate,
    threshold: SlowThreshold,
) -> Result<QueryPerformance, ViewError> {
    let started = Instant::now();
    let window = lookback.window_ending(today)?;

    let mut slow_params = window.params().to_vec();
    slow_params.push(ParamValue::from(threshold.secs()));

    let (metrics, daily_volume, by_type, by_warehouse, expensive, slow, failed_queries) = tokio::try_join!(
        runner.run(&QUERY_METRICS, window.params().into()),
        runner.run(&DAILY_QUERY_VOLUME, window.params().into()),
        runner.run(&QUERIES_BY_TYPE, window.params().into()),
        runner.run(&QUERIES_BY_WAREHOUSE, window.params().into()),
        runner.run(&EXPENSIVE_QUERIES, window.params().into()),
        runner.run(&SLOW_QUERIES, slow_params),
        runner.run(&FAILED_QUERIES, window.params().into()),
    )?;

    let total_queries = metrics.first_i64("TOTAL_QUERIES");
    let successful = metrics.first_i64("SUCCESSFUL");
    let failures_by_type = failed_queries
        .group_counts("ERROR_TYPE")
        .into_iter()
        .map(|(error_type, count)| ErrorTypeCount { error_type, count })
        .collect();

    let report = QueryPerformance {
        window,
        threshold,
        total_queries,
        successful,
        failed: metrics.first_i64("FAILED"),
        success_rate_pct: percent_of(successful as f64, total_queries as f64),
        avg_duration_secs: metrics.first_f64("AVG_DURATION_SECS"),
        max_duration_secs: metrics.first_f64("MAX_DURATION_SECS"),
        tb_scanned: metrics.first_f64("TB_SCANNED"),
        daily_volume,
        by_type: by_type.head(QUERY_TYPES_SHOWN),
        by_warehouse,
        expensive,
        slow,
        failed_queries,
        failures_by_type,
    };

    info!(
        days = lookback.days(),
        threshold_secs = threshold.secs(),
        queries = report.total_queries,
        elapsed_ms = started.elapsed().as_millis(),
        "Loaded query performance"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_cache::QueryCache;
    use insights_models::CacheConfig;
    use insights_source::test_support::{CountingExecutor, MockExecutor};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn threshold_bounds() {
        assert_eq!(SlowThreshold::default().secs(), 60);
        assert_eq!(SlowThreshold::new(10).unwrap().secs(), 10);
        assert_eq!(SlowThreshold::new(300).unwrap().secs(), 300);
        assert!(matches!(
            SlowThreshold::new(9),
            Err(ViewError::InvalidThreshold { secs: 9, .. })
        ));
        assert!(SlowThreshold::new(301).is_err());
    }

    #[test]
    fn lookback_set_excludes_long_windows() {
        assert!(Lookback::select(30, &QUERY_LOOKBACKS).is_ok());
        assert!(Lookback::select(60, &QUERY_LOOKBACKS).is_err());
    }

    #[tokio::test]
    async fn threshold_is_bound_and_keyed() {
        let counting = Arc::new(CountingExecutor::new(MockExecutor::returning(
            TabularResult::empty(vec!["TOTAL_QUERIES".to_string()]),
        )));
        let runner = QueryRunner::new(
            Arc::new(QueryCache::new()),
            counting.clone(),
            CacheConfig::default(),
        );
        let lookback = Lookback::select(7, &QUERY_LOOKBACKS).unwrap();
        let today = date(2024, 6, 15);

        let report = query_performance(&runner, lookback, today, SlowThreshold::default())
            .await
            .unwrap();
        assert_eq!(report.total_queries, 0);
        assert_eq!(report.success_rate_pct, 0.0);
        assert!(report.failures_by_type.is_empty());
        assert_eq!(counting.calls(), 7);

        // Only the slow-query list depends on the threshold.
        query_performance(&runner, lookback, today, SlowThreshold::new(120).unwrap())
            .await
            .unwrap();
        assert_eq!(counting.calls(), 8);
        assert_eq!(counting.calls_for(SLOW_QUERIES.sql), 2);

        let last = counting.statements().pop().unwrap();
        assert_eq!(last.params[2], ParamValue::Int(120));
    }
}
