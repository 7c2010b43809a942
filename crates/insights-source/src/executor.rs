use std::sync::Arc;

use async_trait::async_trait;
use insights_models::{ParamValue, TabularResult};

use crate::error::DataSourceError;

/// A parameterized analytical statement.
///
/// Parameters are positional (`?1`, `?2`, ...) and always bound by the
/// executor, never spliced into the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<ParamValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<ParamValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Runs statements against the account-usage data. Mockable for testing.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, statement: &Statement) -> Result<TabularResult, DataSourceError>;
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn execute(&self, statement: &Statement) -> Result<TabularResult, DataSourceError> {
        (**self).execute(statement).await
    }
}
