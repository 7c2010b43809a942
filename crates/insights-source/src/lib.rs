pub mod error;
pub mod executor;
pub mod sqlite;
pub mod timeout;

pub mod test_support;

pub use error::DataSourceError;
pub use executor::{QueryExecutor, Statement};
pub use sqlite::SqliteSource;
pub use timeout::TimeoutExecutor;
