use std::time::Duration;

use async_trait::async_trait;
use insights_models::TabularResult;
use tracing::warn;

use crate::error::DataSourceError;
use crate::executor::{QueryExecutor, Statement};

/// Bounds every statement of the wrapped executor by a deadline.
pub struct TimeoutExecutor<E> {
    inner: E,
    timeout: Duration,
}

impl<E> TimeoutExecutor<E> {
    pub fn new(inner: E, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

#[async_trait]
impl<E: QueryExecutor> QueryExecutor for TimeoutExecutor<E> {
    async fn execute(&self, statement: &Statement) -> Result<TabularResult, DataSourceError> {
        match tokio::time::timeout(self.timeout, self.inner.execute(statement)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis(), "Statement timed out");
                Err(DataSourceError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockExecutor;

    fn statement() -> Statement {
        Statement::new("SELECT 1 AS N", vec![])
    }

    #[tokio::test]
    async fn passes_through_within_deadline() {
        let exec = TimeoutExecutor::new(
            MockExecutor::returning(TabularResult::empty(vec!["N".to_string()])),
            Duration::from_secs(5),
        );
        let result = exec.execute(&statement()).await.unwrap();
        assert_eq!(result.columns(), ["N"]);
    }

    #[tokio::test]
    async fn elapsed_deadline_is_timeout_error() {
        let exec = TimeoutExecutor::new(
            MockExecutor::returning(TabularResult::empty(vec!["N".to_string()]))
                .with_delay(Duration::from_millis(200)),
            Duration::from_millis(20),
        );
        let err = exec.execute(&statement()).await.unwrap_err();
        assert!(matches!(err, DataSourceError::Timeout(d) if d == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn inner_errors_are_unchanged() {
        let exec = TimeoutExecutor::new(
            MockExecutor::failing("warehouse suspended"),
            Duration::from_secs(5),
        );
        let err = exec.execute(&statement()).await.unwrap_err();
        assert!(matches!(err, DataSourceError::Query(ref m) if m == "warehouse suspended"));
        assert_eq!(exec.into_inner().calls(), 1);
    }
}
