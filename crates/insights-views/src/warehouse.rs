use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use insights_models::{percent_of, Lookback, ParamValue, TabularResult, TimeWindow};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ViewError;
use crate::runner::QueryRunner;
use crate::templates::{
    WAREHOUSE_CACHE_USAGE, WAREHOUSE_CLUSTER_USAGE, WAREHOUSE_DAILY_CREDITS,
    WAREHOUSE_DURATION_BREAKDOWN, WAREHOUSE_ERRORS, WAREHOUSE_EVENTS, WAREHOUSE_HOURLY_CREDITS,
    WAREHOUSE_NAMES, WAREHOUSE_QUERY_TYPES, WAREHOUSE_SIZE_HISTORY, WAREHOUSE_SPILLING,
};

pub const WAREHOUSE_LOOKBACKS: [u32; 5] = [7, 14, 30, 60, 90];
pub const DEFAULT_WAREHOUSE_LOOKBACK: u32 = 7;

const QUERY_TYPES_SHOWN: usize = 10;

/// Credit, scheduling and workload detail for one warehouse.
#[derive(Debug, Clone, Serialize)]
pub struct WarehouseAnalysis {
    pub warehouse: String,
    pub window: TimeWindow,
    /// Every warehouse with metering activity in the window.
    pub warehouses: Vec<String>,
    pub total_credits: f64,
    pub resume_events: usize,
    pub avg_cache_hit_pct: f64,
    pub local_spill_pct: f64,
    pub remote_spill_pct: f64,
    pub daily_credits: Arc<TabularResult>,
    pub hourly_credits: Arc<TabularResult>,
    pub events: Arc<TabularResult>,
    pub size_history: Arc<TabularResult>,
    pub cluster_usage: Arc<TabularResult>,
    pub query_types: TabularResult,
    pub duration_breakdown: Arc<TabularResult>,
    pub cache_usage: Arc<TabularResult>,
    pub errors: Arc<TabularResult>,
}

/// Distinct warehouse names with metering activity in `window`, sorted.
pub async fn warehouse_names(
    runner: &QueryRunner,
    window: TimeWindow,
) -> Result<Vec<String>, ViewError> {
    let names = runner.run(&WAREHOUSE_NAMES, window.params().into()).await?;
    Ok(names.distinct_text("WAREHOUSE_NAME"))
}

/// Analysis of `selected`, or of the first active warehouse when none is given.
///
/// Returns `Ok(None)` when no warehouse was active in the window. A selection
/// that is not in the active list is rejected rather than queried.
pub async fn warehouse_analysis(
    runner: &QueryRunner,
    lookback: Lookback,
    today: NaiveDate,
    selected: Option<&str>,
) -> Result<Option<WarehouseAnalysis>, ViewError> {
    let started = Instant::now();
    let window = lookback.window_ending(today)?;
    let warehouses = warehouse_names(runner, window).await?;

    let warehouse = match (selected, warehouses.first()) {
        (_, None) => {
            debug!(window = %window, "No active warehouses");
            return Ok(None);
        }
        (None, Some(first)) => first.clone(),
        (Some(name), Some(_)) => {
            if !warehouses.iter().any(|w| w == name) {
                return Err(ViewError::UnknownWarehouse(name.to_string()));
            }
            name.to_string()
        }
    };

    let params = || {
        let mut params = window.params().to_vec();
        params.push(ParamValue::from(warehouse.as_str()));
        params
    };

    let (
        daily_credits,
        hourly_credits,
        events,
        size_history,
        cluster_usage,
        query_types,
        duration_breakdown,
        cache_usage,
        spilling,
        errors,
    ) = tokio::try_join!(
        runner.run(&WAREHOUSE_DAILY_CREDITS, params()),
        runner.run(&WAREHOUSE_HOURLY_CREDITS, params()),
        runner.run(&WAREHOUSE_EVENTS, params()),
        runner.run(&WAREHOUSE_SIZE_HISTORY, params()),
        runner.run(&WAREHOUSE_CLUSTER_USAGE, params()),
        runner.run(&WAREHOUSE_QUERY_TYPES, params()),
        runner.run(&WAREHOUSE_DURATION_BREAKDOWN, params()),
        runner.run(&WAREHOUSE_CACHE_USAGE, params()),
        runner.run(&WAREHOUSE_SPILLING, params()),
        runner.run(&WAREHOUSE_ERRORS, params()),
    )?;

    let total_jobs = spilling.first_f64("TOTAL_JOBS");
    let analysis = WarehouseAnalysis {
        window,
        total_credits: daily_credits.sum_f64("CREDITS"),
        resume_events: events.count_text("EVENT_NAME", "RESUME_WAREHOUSE"),
        avg_cache_hit_pct: cache_usage.mean_f64("PCT_FROM_CACHE"),
        local_spill_pct: percent_of(spilling.first_f64("JOBS_SPILLED_LOCAL"), total_jobs),
        remote_spill_pct: percent_of(spilling.first_f64("JOBS_SPILLED_REMOTE"), total_jobs),
        query_types: query_types.head(QUERY_TYPES_SHOWN),
        daily_credits,
        hourly_credits,
        events,
        size_history,
        cluster_usage,
        duration_breakdown,
        cache_usage,
        errors,
        warehouses,
        warehouse,
    };

    info!(
        warehouse = %analysis.warehouse,
        window = %analysis.window,
        credits = analysis.total_credits,
        elapsed_ms = started.elapsed().as_millis(),
        "Loaded warehouse analysis"
    );
    Ok(Some(analysis))
}
