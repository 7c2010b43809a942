//! Named, parameterized statements over the account-usage replica.
//!
//! Every template binds its window as `?1` (inclusive start) and `?2`
//! (exclusive end), followed by any sub-selection. The template id is the
//! first component of the cache key, so two templates never share an id.

use insights_models::{CacheConfig, ViewFamily};

use crate::error::ViewError;

/// One analytical statement shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub id: &'static str,
    pub family: ViewFamily,
    /// Number of positional parameters the SQL binds.
    pub arity: usize,
    pub sql: &'static str,
}

// Executive overview

pub const CREDIT_SUMMARY: QueryTemplate = QueryTemplate {
    id: "credit_summary",
    family: ViewFamily::WarehouseMetering,
    arity: 4,
    sql: r#"
SELECT
    (SELECT COALESCE(SUM(CREDITS_USED), 0)
       FROM WAREHOUSE_METERING_HISTORY
      WHERE START_TIME >= ?1 AND START_TIME < ?2) AS CURRENT_CREDITS,
    (SELECT COALESCE(SUM(CREDITS_USED), 0)
       FROM WAREHOUSE_METERING_HISTORY
      WHERE START_TIME >= ?3 AND START_TIME < ?4) AS PREVIOUS_CREDITS"#,
};

pub const DAILY_CREDITS: QueryTemplate = QueryTemplate {
    id: "daily_credits",
    family: ViewFamily::WarehouseMetering,
    arity: 2,
    sql: r#"
SELECT
    date(START_TIME) AS USAGE_DATE,
    ROUND(SUM(CREDITS_USED), 2) AS CREDITS,
    ROUND(SUM(CREDITS_USED_COMPUTE), 2) AS COMPUTE_CREDITS,
    ROUND(SUM(CREDITS_USED_CLOUD_SERVICES), 2) AS CLOUD_SERVICES_CREDITS
FROM WAREHOUSE_METERING_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 1"#,
};

pub const WAREHOUSE_BREAKDOWN: QueryTemplate = QueryTemplate {
    id: "warehouse_breakdown",
    family: ViewFamily::WarehouseMetering,
    arity: 2,
    sql: r#"
SELECT
    WAREHOUSE_NAME,
    ROUND(SUM(CREDITS_USED), 2) AS CREDITS
FROM WAREHOUSE_METERING_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 2 DESC
LIMIT 10"#,
};

pub const QUERY_SUMMARY: QueryTemplate = QueryTemplate {
    id: "query_summary",
    family: ViewFamily::QueryHistory,
    arity: 2,
    sql: r#"
SELECT
    COUNT(*) AS TOTAL_QUERIES,
    COUNT(CASE WHEN EXECUTION_STATUS = 'SUCCESS' THEN 1 END) AS SUCCESSFUL,
    COUNT(CASE WHEN EXECUTION_STATUS != 'SUCCESS' THEN 1 END) AS FAILED,
    ROUND(AVG(TOTAL_ELAPSED_TIME) / 1000.0, 2) AS AVG_DURATION_SECS
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2"#,
};

pub const STORAGE_SUMMARY: QueryTemplate = QueryTemplate {
    id: "storage_summary",
    family: ViewFamily::StorageUsage,
    arity: 2,
    sql: r#"
SELECT
    ROUND(AVG(STORAGE_BYTES + STAGE_BYTES + FAILSAFE_BYTES) / 1099511627776.0, 2) AS TOTAL_TB
FROM STORAGE_USAGE
WHERE USAGE_DATE >= ?1 AND USAGE_DATE < ?2"#,
};

pub const WAREHOUSE_USAGE_SUMMARY: QueryTemplate = QueryTemplate {
    id: "warehouse_usage_summary",
    family: ViewFamily::WarehouseMetering,
    arity: 2,
    sql: r#"
SELECT
    WAREHOUSE_NAME,
    ROUND(SUM(CREDITS_USED), 2) AS CREDITS_USED,
    COUNT(DISTINCT strftime('%Y-%m-%d %H', START_TIME)) AS ACTIVE_HOURS,
    ROUND(SUM(CREDITS_USED)
          / NULLIF(COUNT(DISTINCT strftime('%Y-%m-%d %H', START_TIME)), 0), 2) AS CREDITS_PER_HOUR
FROM WAREHOUSE_METERING_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 2 DESC"#,
};

// Warehouse analysis. `?3` is the warehouse name.

pub const WAREHOUSE_NAMES: QueryTemplate = QueryTemplate {
    id: "warehouse_names",
    family: ViewFamily::WarehouseMetering,
    arity: 2,
    sql: r#"
SELECT DISTINCT WAREHOUSE_NAME
FROM WAREHOUSE_METERING_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
ORDER BY WAREHOUSE_NAME"#,
};

pub const WAREHOUSE_DAILY_CREDITS: QueryTemplate = QueryTemplate {
    id: "warehouse_daily_credits",
    family: ViewFamily::WarehouseMetering,
    arity: 3,
    sql: r#"
SELECT
    date(START_TIME) AS USAGE_DATE,
    ROUND(SUM(CREDITS_USED), 2) AS CREDITS
FROM WAREHOUSE_METERING_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 1"#,
};

pub const WAREHOUSE_HOURLY_CREDITS: QueryTemplate = QueryTemplate {
    id: "warehouse_hourly_credits",
    family: ViewFamily::WarehouseMetering,
    arity: 3,
    sql: r#"
SELECT
    strftime('%Y-%m-%d %H:00:00', START_TIME) AS USAGE_HOUR,
    ROUND(SUM(CREDITS_USED), 4) AS CREDITS,
    ROUND(SUM(CREDITS_USED_CLOUD_SERVICES), 4) AS GS_CREDITS
FROM WAREHOUSE_METERING_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 1"#,
};

pub const WAREHOUSE_EVENTS: QueryTemplate = QueryTemplate {
    id: "warehouse_events",
    family: ViewFamily::WarehouseEvents,
    arity: 3,
    sql: r#"
SELECT
    "TIMESTAMP",
    EVENT_NAME,
    CLUSTER_NUMBER
FROM WAREHOUSE_EVENTS_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND "TIMESTAMP" >= ?1 AND "TIMESTAMP" < ?2
  AND EVENT_NAME IN ('RESUME_WAREHOUSE', 'SUSPEND_WAREHOUSE')
ORDER BY "TIMESTAMP""#,
};

pub const WAREHOUSE_SIZE_HISTORY: QueryTemplate = QueryTemplate {
    id: "warehouse_size_history",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    strftime('%Y-%m-%d %H:00:00', START_TIME) AS USAGE_HOUR,
    WAREHOUSE_SIZE,
    COUNT(*) AS QUERY_COUNT
FROM QUERY_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
  AND WAREHOUSE_SIZE IS NOT NULL
GROUP BY 1, 2
ORDER BY 1"#,
};

pub const WAREHOUSE_CLUSTER_USAGE: QueryTemplate = QueryTemplate {
    id: "warehouse_cluster_usage",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    strftime('%Y-%m-%d %H:00:00', START_TIME) AS USAGE_HOUR,
    COALESCE(CLUSTER_NUMBER, 0) AS CLUSTER_NUMBER,
    COUNT(*) AS QUERY_COUNT
FROM QUERY_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1, 2
ORDER BY 1, 2"#,
};

pub const WAREHOUSE_QUERY_TYPES: QueryTemplate = QueryTemplate {
    id: "warehouse_query_types",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    QUERY_TYPE,
    COUNT(*) AS QUERY_COUNT,
    ROUND(SUM(TOTAL_ELAPSED_TIME) / 60000.0, 2) AS DURATION_MINS
FROM QUERY_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 2 DESC"#,
};

pub const WAREHOUSE_DURATION_BREAKDOWN: QueryTemplate = QueryTemplate {
    id: "warehouse_duration_breakdown",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    strftime('%Y-%m-%d %H:00:00', START_TIME) AS USAGE_HOUR,
    ROUND(AVG(COMPILATION_TIME) / 1000.0, 2) AS AVG_COMPILE_SECS,
    ROUND(AVG(QUEUED_PROVISIONING_TIME + QUEUED_REPAIR_TIME + QUEUED_OVERLOAD_TIME) / 1000.0, 2) AS AVG_QUEUE_SECS,
    ROUND(AVG(EXECUTION_TIME) / 1000.0, 2) AS AVG_EXEC_SECS
FROM QUERY_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 1"#,
};

pub const WAREHOUSE_CACHE_USAGE: QueryTemplate = QueryTemplate {
    id: "warehouse_cache_usage",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    strftime('%Y-%m-%d %H:00:00', START_TIME) AS USAGE_HOUR,
    ROUND(AVG(PERCENTAGE_SCANNED_FROM_CACHE), 2) AS PCT_FROM_CACHE
FROM QUERY_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
  AND BYTES_SCANNED > 0
GROUP BY 1
ORDER BY 1"#,
};

pub const WAREHOUSE_SPILLING: QueryTemplate = QueryTemplate {
    id: "warehouse_spilling",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    COUNT(CASE WHEN BYTES_SPILLED_TO_LOCAL_STORAGE > 0 THEN 1 END) AS JOBS_SPILLED_LOCAL,
    COUNT(CASE WHEN BYTES_SPILLED_TO_REMOTE_STORAGE > 0 THEN 1 END) AS JOBS_SPILLED_REMOTE,
    COUNT(*) AS TOTAL_JOBS
FROM QUERY_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2"#,
};

pub const WAREHOUSE_ERRORS: QueryTemplate = QueryTemplate {
    id: "warehouse_errors",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    CASE
        WHEN ERROR_MESSAGE LIKE 'Statement reached its statement or warehouse timeout%' THEN 'Compute timeout'
        WHEN ERROR_MESSAGE LIKE 'Statement reached its statement or warehouse queuing timeout%' THEN 'Queuing timeout'
        WHEN ERROR_MESSAGE LIKE 'SQL execution canceled%' THEN 'Execution canceled'
        WHEN ERROR_MESSAGE LIKE 'SQL compilation error%' THEN 'Compilation error'
        WHEN ERROR_MESSAGE LIKE '%access control error%' THEN 'Access control error'
        ELSE 'Other'
    END AS ERROR_CATEGORY,
    COUNT(*) AS ERROR_COUNT
FROM QUERY_HISTORY
WHERE WAREHOUSE_NAME = ?3
  AND START_TIME >= ?1 AND START_TIME < ?2
  AND ERROR_CODE IS NOT NULL
GROUP BY 1
ORDER BY 2 DESC"#,
};

// Query performance

pub const QUERY_METRICS: QueryTemplate = QueryTemplate {
    id: "query_metrics",
    family: ViewFamily::QueryHistory,
    arity: 2,
    sql: r#"
SELECT
    COUNT(*) AS TOTAL_QUERIES,
    COUNT(CASE WHEN EXECUTION_STATUS = 'SUCCESS' THEN 1 END) AS SUCCESSFUL,
    COUNT(CASE WHEN EXECUTION_STATUS != 'SUCCESS' THEN 1 END) AS FAILED,
    ROUND(AVG(TOTAL_ELAPSED_TIME) / 1000.0, 2) AS AVG_DURATION_SECS,
    ROUND(MAX(TOTAL_ELAPSED_TIME) / 1000.0, 2) AS MAX_DURATION_SECS,
    ROUND(COALESCE(SUM(BYTES_SCANNED), 0) / 1099511627776.0, 2) AS TB_SCANNED
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2"#,
};

pub const DAILY_QUERY_VOLUME: QueryTemplate = QueryTemplate {
    id: "daily_query_volume",
    family: ViewFamily::QueryHistory,
    arity: 2,
    sql: r#"
SELECT
    date(START_TIME) AS QUERY_DATE,
    COUNT(*) AS QUERY_COUNT,
    COUNT(CASE WHEN EXECUTION_STATUS = 'SUCCESS' THEN 1 END) AS SUCCESS_COUNT,
    COUNT(CASE WHEN EXECUTION_STATUS != 'SUCCESS' THEN 1 END) AS FAILED_COUNT
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 1"#,
};

pub const EXPENSIVE_QUERIES: QueryTemplate = QueryTemplate {
    id: "expensive_queries",
    family: ViewFamily::QueryHistory,
    arity: 2,
    sql: r#"
SELECT
    QUERY_ID,
    USER_NAME,
    WAREHOUSE_NAME,
    QUERY_TYPE,
    ROUND(TOTAL_ELAPSED_TIME / 1000.0, 1) AS DURATION_SECS,
    ROUND(BYTES_SCANNED / 1073741824.0, 2) AS GB_SCANNED,
    ROUND(CREDITS_USED_CLOUD_SERVICES, 4) AS CS_CREDITS,
    substr(QUERY_TEXT, 1, 100) AS QUERY_PREVIEW
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
  AND BYTES_SCANNED > 0
ORDER BY BYTES_SCANNED DESC
LIMIT 20"#,
};

/// `?3` is the threshold in whole seconds.
pub const SLOW_QUERIES: QueryTemplate = QueryTemplate {
    id: "slow_queries",
    family: ViewFamily::QueryHistory,
    arity: 3,
    sql: r#"
SELECT
    QUERY_ID,
    USER_NAME,
    WAREHOUSE_NAME,
    QUERY_TYPE,
    ROUND(TOTAL_ELAPSED_TIME / 1000.0, 1) AS DURATION_SECS,
    ROUND(COMPILATION_TIME / 1000.0, 1) AS COMPILE_SECS,
    ROUND(EXECUTION_TIME / 1000.0, 1) AS EXEC_SECS,
    substr(QUERY_TEXT, 1, 100) AS QUERY_PREVIEW
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
  AND TOTAL_ELAPSED_TIME > ?3 * 1000
  AND EXECUTION_STATUS = 'SUCCESS'
ORDER BY TOTAL_ELAPSED_TIME DESC
LIMIT 20"#,
};

pub const FAILED_QUERIES: QueryTemplate = QueryTemplate {
    id: "failed_queries",
    family: ViewFamily::QueryHistory,
    arity: 2,
    sql: r#"
SELECT
    QUERY_ID,
    USER_NAME,
    WAREHOUSE_NAME,
    ERROR_CODE,
    CASE
        WHEN ERROR_MESSAGE LIKE 'Statement reached its statement or warehouse timeout%' THEN 'Timeout'
        WHEN ERROR_MESSAGE LIKE 'SQL execution canceled%' THEN 'Canceled'
        WHEN ERROR_MESSAGE LIKE 'SQL compilation error%' THEN 'Compilation'
        WHEN ERROR_MESSAGE LIKE '%access control%' THEN 'Access Control'
        ELSE 'Other'
    END AS ERROR_TYPE,
    substr(ERROR_MESSAGE, 1, 100) AS ERROR_PREVIEW,
    START_TIME
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
  AND EXECUTION_STATUS != 'SUCCESS'
ORDER BY START_TIME DESC
LIMIT 50"#,
};

pub const QUERIES_BY_TYPE: QueryTemplate = QueryTemplate {
    id: "queries_by_type",
    family: ViewFamily::QueryHistory,
    arity: 2,
    sql: r#"
SELECT
    QUERY_TYPE,
    COUNT(*) AS QUERY_COUNT,
    ROUND(AVG(TOTAL_ELAPSED_TIME) / 1000.0, 2) AS AVG_DURATION_SECS,
    ROUND(COALESCE(SUM(BYTES_SCANNED), 0) / 1073741824.0, 2) AS TOTAL_GB_SCANNED
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 2 DESC"#,
};

pub const QUERIES_BY_WAREHOUSE: QueryTemplate = QueryTemplate {
    id: "queries_by_warehouse",
    family: ViewFamily::QueryHistory,
    arity: 2,
    sql: r#"
SELECT
    COALESCE(WAREHOUSE_NAME, 'Cloud Services') AS WAREHOUSE_NAME,
    COUNT(*) AS QUERY_COUNT,
    ROUND(AVG(TOTAL_ELAPSED_TIME) / 1000.0, 2) AS AVG_DURATION_SECS
FROM QUERY_HISTORY
WHERE START_TIME >= ?1 AND START_TIME < ?2
GROUP BY 1
ORDER BY 2 DESC"#,
};

// Storage analysis

pub const STORAGE_OVERVIEW: QueryTemplate = QueryTemplate {
    id: "storage_overview",
    family: ViewFamily::StorageUsage,
    arity: 2,
    sql: r#"
SELECT
    USAGE_DATE,
    ROUND(STORAGE_BYTES / 1099511627776.0, 4) AS STORAGE_TB,
    ROUND(STAGE_BYTES / 1099511627776.0, 4) AS STAGE_TB,
    ROUND(FAILSAFE_BYTES / 1099511627776.0, 4) AS FAILSAFE_TB,
    ROUND((STORAGE_BYTES + STAGE_BYTES + FAILSAFE_BYTES) / 1099511627776.0, 4) AS TOTAL_TB
FROM STORAGE_USAGE
WHERE USAGE_DATE >= ?1 AND USAGE_DATE < ?2
ORDER BY USAGE_DATE"#,
};

pub const DATABASE_STORAGE: QueryTemplate = QueryTemplate {
    id: "database_storage",
    family: ViewFamily::DatabaseStorage,
    arity: 2,
    sql: r#"
SELECT
    DATABASE_NAME,
    ROUND(AVG(AVERAGE_DATABASE_BYTES) / 1073741824.0, 2) AS AVG_DB_GB,
    ROUND(AVG(AVERAGE_FAILSAFE_BYTES) / 1073741824.0, 2) AS AVG_FAILSAFE_GB
FROM DATABASE_STORAGE_USAGE_HISTORY
WHERE USAGE_DATE >= ?1 AND USAGE_DATE < ?2
GROUP BY 1
ORDER BY 2 DESC
LIMIT 20"#,
};

pub const DATABASE_GROWTH: QueryTemplate = QueryTemplate {
    id: "database_growth",
    family: ViewFamily::DatabaseStorage,
    arity: 2,
    sql: r#"
SELECT
    DATABASE_NAME,
    USAGE_DATE,
    ROUND(AVERAGE_DATABASE_BYTES / 1073741824.0, 2) AS DB_GB
FROM DATABASE_STORAGE_USAGE_HISTORY
WHERE USAGE_DATE >= ?1 AND USAGE_DATE < ?2
ORDER BY USAGE_DATE"#,
};

pub const STORAGE_TABLES: QueryTemplate = QueryTemplate {
    id: "storage_tables",
    family: ViewFamily::TableStorage,
    arity: 0,
    sql: r#"
SELECT
    TABLE_CATALOG AS DATABASE_NAME,
    TABLE_SCHEMA AS SCHEMA_NAME,
    TABLE_NAME,
    ROUND(ACTIVE_BYTES / 1073741824.0, 4) AS ACTIVE_GB,
    ROUND(TIME_TRAVEL_BYTES / 1073741824.0, 4) AS TIME_TRAVEL_GB,
    ROUND(FAILSAFE_BYTES / 1073741824.0, 4) AS FAILSAFE_GB,
    ROUND((ACTIVE_BYTES + TIME_TRAVEL_BYTES + FAILSAFE_BYTES) / 1073741824.0, 4) AS TOTAL_GB,
    CLONE_GROUP_ID
FROM TABLE_STORAGE_METRICS
WHERE ACTIVE_BYTES > 0
  AND DELETED IS NULL
ORDER BY ACTIVE_BYTES DESC
LIMIT 50"#,
};

pub const STORAGE_BY_TYPE: QueryTemplate = QueryTemplate {
    id: "storage_by_type",
    family: ViewFamily::StorageUsage,
    arity: 0,
    sql: r#"
SELECT
    ROUND(STORAGE_BYTES / 1099511627776.0, 4) AS DATABASE_TB,
    ROUND(STAGE_BYTES / 1099511627776.0, 4) AS STAGE_TB,
    ROUND(FAILSAFE_BYTES / 1099511627776.0, 4) AS FAILSAFE_TB
FROM STORAGE_USAGE
WHERE USAGE_DATE = (SELECT MAX(USAGE_DATE) FROM STORAGE_USAGE)"#,
};

/// Every template, grouped by view.
pub const CATALOG: &[QueryTemplate] = &[
    CREDIT_SUMMARY,
    DAILY_CREDITS,
    WAREHOUSE_BREAKDOWN,
    QUERY_SUMMARY,
    STORAGE_SUMMARY,
    WAREHOUSE_USAGE_SUMMARY,
    WAREHOUSE_NAMES,
    WAREHOUSE_DAILY_CREDITS,
    WAREHOUSE_HOURLY_CREDITS,
    WAREHOUSE_EVENTS,
    WAREHOUSE_SIZE_HISTORY,
    WAREHOUSE_CLUSTER_USAGE,
    WAREHOUSE_QUERY_TYPES,
    WAREHOUSE_DURATION_BREAKDOWN,
    WAREHOUSE_CACHE_USAGE,
    WAREHOUSE_SPILLING,
    WAREHOUSE_ERRORS,
    QUERY_METRICS,
    DAILY_QUERY_VOLUME,
    EXPENSIVE_QUERIES,
    SLOW_QUERIES,
    FAILED_QUERIES,
    QUERIES_BY_TYPE,
    QUERIES_BY_WAREHOUSE,
    STORAGE_OVERVIEW,
    DATABASE_STORAGE,
    DATABASE_GROWTH,
    STORAGE_TABLES,
    STORAGE_BY_TYPE,
];

pub fn lookup(id: &str) -> Option<&'static QueryTemplate> {
    CATALOG.iter().find(|t| t.id == id)
}

/// Reject TTL overrides keyed by an id that names no template.
pub fn check_ttl_overrides(config: &CacheConfig) -> Result<(), ViewError> {
    let mut unknown: Vec<&String> = config
        .template_ttl_seconds
        .keys()
        .filter(|id| lookup(id).is_none())
        .collect();
    unknown.sort();
    match unknown.first() {
        Some(id) => Err(ViewError::UnknownTemplate((*id).clone())),
        None => Ok(()),
    }
}
