use insights_models::WindowError;
use insights_source::DataSourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("Invalid time window: {0}")]
    Window(#[from] WindowError),

    #[error("Warehouse not active in the selected period: {0}")]
    UnknownWarehouse(String),

    #[error("Slow-query threshold of {secs}s is outside {min}..={max}")]
    InvalidThreshold { secs: u32, min: u32, max: u32 },

    #[error("No query template with id {0}")]
    UnknownTemplate(String),

    #[error("Template {template} takes {expected} parameters, got {found}")]
    Arity {
        template: &'static str,
        expected: usize,
        found: usize,
    },
}
