//! Test doubles for [`QueryExecutor`].
//!
//! `MockExecutor` answers every statement with a canned result (or a canned
//! failure). `CountingExecutor` wraps a real executor and records which
//! statements reached it, which is how cache behavior is observed from the
//! outside.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use insights_models::TabularResult;

use crate::error::DataSourceError;
use crate::executor::{QueryExecutor, Statement};

/// Executor that returns a fixed outcome for every statement.
pub struct MockExecutor {
    outcome: Result<TabularResult, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockExecutor {
    pub fn returning(result: TabularResult) -> Self {
        Self {
            outcome: Ok(result),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with `DataSourceError::Query(message)`.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute(&self, _statement: &Statement) -> Result<TabularResult, DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone().map_err(DataSourceError::Query)
    }
}

/// Wraps an executor and records every statement it forwards.
pub struct CountingExecutor<E> {
    inner: E,
    seen: Mutex<Vec<Statement>>,
}

impl<E> CountingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// How many forwarded statements carried exactly this SQL text.
    pub fn calls_for(&self, sql: &str) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.sql == sql)
            .count()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

#[async_trait]
impl<E: QueryExecutor> QueryExecutor for CountingExecutor<E> {
    async fn execute(&self, statement: &Statement) -> Result<TabularResult, DataSourceError> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(statement.clone());
        self.inner.execute(statement).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_models::ParamValue;

    #[tokio::test]
    async fn mock_counts_calls() {
        let mock = MockExecutor::returning(TabularResult::empty(vec!["A".to_string()]));
        let stmt = Statement::new("SELECT 1", vec![]);
        mock.execute(&stmt).await.unwrap();
        mock.execute(&stmt).await.unwrap();
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn counting_records_statements() {
        let counting = CountingExecutor::new(MockExecutor::failing("boom"));
        let a = Statement::new("SELECT A", vec![ParamValue::Int(1)]);
        let b = Statement::new("SELECT B", vec![]);

        assert!(counting.execute(&a).await.is_err());
        assert!(counting.execute(&a).await.is_err());
        assert!(counting.execute(&b).await.is_err());

        assert_eq!(counting.calls(), 3);
        assert_eq!(counting.calls_for("SELECT A"), 2);
        assert_eq!(counting.statements()[0], a);
        assert_eq!(counting.inner().calls(), 3);
    }
}
