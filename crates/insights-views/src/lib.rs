pub mod error;
pub mod overview;
pub mod query_performance;
pub mod runner;
pub mod storage;
pub mod templates;
pub mod warehouse;

pub use error::ViewError;
pub use overview::{executive_overview, ExecutiveOverview};
pub use query_performance::{query_performance, QueryPerformance, SlowThreshold};
pub use runner::QueryRunner;
pub use storage::{storage_analysis, StorageAnalysis};
pub use templates::QueryTemplate;
pub use warehouse::{warehouse_analysis, warehouse_names, WarehouseAnalysis};
