use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use insights_models::{CacheKey, TabularResult};

/// A stored query result. Replaced wholesale on refresh, never mutated.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: Arc<TabularResult>,
    pub created_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(
        key: CacheKey,
        value: Arc<TabularResult>,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            key,
            value,
            created_at,
            ttl,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.created_at)
    }

    /// Fresh while `now - created_at < ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => self.age(now) < ttl,
            // TTL beyond chrono's range never elapses
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use insights_models::ParamValue;

    fn entry_at(created_at: DateTime<Utc>, ttl_secs: u64) -> CacheEntry {
        CacheEntry::new(
            CacheKey::new("daily_credits", Vec::<ParamValue>::new()),
            Arc::new(TabularResult::empty(vec!["CREDITS".to_string()])),
            created_at,
            Duration::from_secs(ttl_secs),
        )
    }

    #[test]
    fn fresh_until_ttl_elapses() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let entry = entry_at(t0, 3600);

        assert!(entry.is_fresh(t0));
        assert!(entry.is_fresh(t0 + chrono::Duration::seconds(3599)));
        assert!(entry.is_fresh(t0 + chrono::Duration::milliseconds(3_599_999)));
        assert!(!entry.is_fresh(t0 + chrono::Duration::seconds(3600)));
        assert!(!entry.is_fresh(t0 + chrono::Duration::days(1)));
    }

    #[test]
    fn age_is_signed() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let entry = entry_at(t0, 60);
        assert_eq!(entry.age(t0 + chrono::Duration::seconds(10)).num_seconds(), 10);
        assert_eq!(entry.age(t0 - chrono::Duration::seconds(5)).num_seconds(), -5);
    }
}
