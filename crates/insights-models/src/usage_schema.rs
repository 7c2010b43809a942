use serde::{Deserialize, Serialize};

/// The account-usage view families queried by the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewFamily {
    WarehouseMetering,
    WarehouseEvents,
    QueryHistory,
    StorageUsage,
    DatabaseStorage,
    TableStorage,
}

impl ViewFamily {
    pub const ALL: [ViewFamily; 6] = [
        ViewFamily::WarehouseMetering,
        ViewFamily::WarehouseEvents,
        ViewFamily::QueryHistory,
        ViewFamily::StorageUsage,
        ViewFamily::DatabaseStorage,
        ViewFamily::TableStorage,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            ViewFamily::WarehouseMetering => "WAREHOUSE_METERING_HISTORY",
            ViewFamily::WarehouseEvents => "WAREHOUSE_EVENTS_HISTORY",
            ViewFamily::QueryHistory => "QUERY_HISTORY",
            ViewFamily::StorageUsage => "STORAGE_USAGE",
            ViewFamily::DatabaseStorage => "DATABASE_STORAGE_USAGE_HISTORY",
            ViewFamily::TableStorage => "TABLE_STORAGE_METRICS",
        }
    }
}

/// Schema of the local replica of the account-usage views.
///
/// Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text and dates as
/// `YYYY-MM-DD`, so lexical comparison against bound date parameters gives
/// the `>= start AND < end` window semantics. Durations are milliseconds.
pub const USAGE_VIEWS_DDL: &str = "\
CREATE TABLE IF NOT EXISTS WAREHOUSE_METERING_HISTORY (
    START_TIME                   TEXT NOT NULL,
    END_TIME                     TEXT NOT NULL,
    WAREHOUSE_NAME               TEXT NOT NULL,
    CREDITS_USED                 REAL NOT NULL DEFAULT 0,
    CREDITS_USED_COMPUTE         REAL NOT NULL DEFAULT 0,
    CREDITS_USED_CLOUD_SERVICES  REAL NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS WAREHOUSE_EVENTS_HISTORY (
    \"TIMESTAMP\"     TEXT NOT NULL,
    WAREHOUSE_NAME  TEXT NOT NULL,
    EVENT_NAME      TEXT NOT NULL,
    CLUSTER_NUMBER  INTEGER
);
CREATE TABLE IF NOT EXISTS QUERY_HISTORY (
    QUERY_ID                         TEXT PRIMARY KEY,
    QUERY_TEXT                       TEXT,
    QUERY_TYPE                       TEXT,
    USER_NAME                        TEXT,
    WAREHOUSE_NAME                   TEXT,
    WAREHOUSE_SIZE                   TEXT,
    CLUSTER_NUMBER                   INTEGER,
    EXECUTION_STATUS                 TEXT NOT NULL,
    ERROR_CODE                       TEXT,
    ERROR_MESSAGE                    TEXT,
    START_TIME                       TEXT NOT NULL,
    TOTAL_ELAPSED_TIME               INTEGER NOT NULL DEFAULT 0,
    COMPILATION_TIME                 INTEGER NOT NULL DEFAULT 0,
    EXECUTION_TIME                   INTEGER NOT NULL DEFAULT 0,
    QUEUED_PROVISIONING_TIME         INTEGER NOT NULL DEFAULT 0,
    QUEUED_REPAIR_TIME               INTEGER NOT NULL DEFAULT 0,
    QUEUED_OVERLOAD_TIME             INTEGER NOT NULL DEFAULT 0,
    BYTES_SCANNED                    INTEGER NOT NULL DEFAULT 0,
    PERCENTAGE_SCANNED_FROM_CACHE    REAL NOT NULL DEFAULT 0,
    BYTES_SPILLED_TO_LOCAL_STORAGE   INTEGER NOT NULL DEFAULT 0,
    BYTES_SPILLED_TO_REMOTE_STORAGE  INTEGER NOT NULL DEFAULT 0,
    CREDITS_USED_CLOUD_SERVICES      REAL NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS STORAGE_USAGE (
    USAGE_DATE      TEXT PRIMARY KEY,
    STORAGE_BYTES   INTEGER NOT NULL DEFAULT 0,
    STAGE_BYTES     INTEGER NOT NULL DEFAULT 0,
    FAILSAFE_BYTES  INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS DATABASE_STORAGE_USAGE_HISTORY (
    USAGE_DATE              TEXT NOT NULL,
    DATABASE_NAME           TEXT NOT NULL,
    AVERAGE_DATABASE_BYTES  INTEGER NOT NULL DEFAULT 0,
    AVERAGE_FAILSAFE_BYTES  INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS TABLE_STORAGE_METRICS (
    TABLE_CATALOG      TEXT NOT NULL,
    TABLE_SCHEMA       TEXT NOT NULL,
    TABLE_NAME         TEXT NOT NULL,
    ACTIVE_BYTES       INTEGER NOT NULL DEFAULT 0,
    TIME_TRAVEL_BYTES  INTEGER NOT NULL DEFAULT 0,
    FAILSAFE_BYTES     INTEGER NOT NULL DEFAULT 0,
    CLONE_GROUP_ID     INTEGER,
    DELETED            TEXT
);
CREATE INDEX IF NOT EXISTS idx_metering_start ON WAREHOUSE_METERING_HISTORY(START_TIME);
CREATE INDEX IF NOT EXISTS idx_query_start ON QUERY_HISTORY(START_TIME);
CREATE INDEX IF NOT EXISTS idx_query_warehouse ON QUERY_HISTORY(WAREHOUSE_NAME);
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_declares_every_family() {
        for family in ViewFamily::ALL {
            let create = format!("CREATE TABLE IF NOT EXISTS {} (", family.table_name());
            assert!(USAGE_VIEWS_DDL.contains(&create), "missing {create}");
        }
    }

    #[test]
    fn view_family_serialization() {
        assert_eq!(
            serde_json::to_string(&ViewFamily::DatabaseStorage).unwrap(),
            "\"database_storage\""
        );
        let parsed: ViewFamily = serde_json::from_str("\"query_history\"").unwrap();
        assert_eq!(parsed, ViewFamily::QueryHistory);
    }
}
