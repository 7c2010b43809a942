pub mod cache_key;
pub mod config;
pub mod metrics;
pub mod tabular;
pub mod usage_schema;
pub mod window;

pub use cache_key::{CacheKey, ParamValue};
pub use config::{CacheConfig, ConfigError, InsightsConfig, SourceConfig};
pub use metrics::{percent_delta, percent_of};
pub use tabular::{ScalarValue, TabularError, TabularResult};
pub use usage_schema::ViewFamily;
pub use window::{Lookback, TimeWindow, WindowError};
