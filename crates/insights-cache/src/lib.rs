pub mod clock;
pub mod entry;
pub mod query_cache;
pub mod stats;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use query_cache::QueryCache;
pub use stats::CacheStats;
