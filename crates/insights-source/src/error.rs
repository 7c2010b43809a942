use std::time::Duration;

use insights_models::TabularError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unsupported value in column {column}: {reason}")]
    Decode { column: String, reason: String },

    #[error("Malformed result: {0}")]
    Shape(#[from] TabularError),

    #[error("Data source not available: {0}")]
    Unavailable(String),
}
