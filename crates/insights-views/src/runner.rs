use std::sync::Arc;
use std::time::Duration;

use insights_cache::{CacheStats, QueryCache};
use insights_models::{CacheConfig, CacheKey, ParamValue, TabularResult};
use insights_source::{QueryExecutor, Statement};

use crate::error::ViewError;
use crate::templates::QueryTemplate;

/// Runs catalog templates through the query cache.
///
/// The cache key and the executed statement are built from the same
/// parameter vector, so every bound value is part of the key.
pub struct QueryRunner {
    cache: Arc<QueryCache>,
    executor: Arc<dyn QueryExecutor>,
    cache_config: CacheConfig,
}

impl QueryRunner {
    pub fn new(
        cache: Arc<QueryCache>,
        executor: Arc<dyn QueryExecutor>,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            cache,
            executor,
            cache_config,
        }
    }

    /// Fresh cached result for `template` bound to `params`, computing it on a miss.
    pub async fn run(
        &self,
        template: &QueryTemplate,
        params: Vec<ParamValue>,
    ) -> Result<Arc<TabularResult>, ViewError> {
        if params.len() != template.arity {
            return Err(ViewError::Arity {
                template: template.id,
                expected: template.arity,
                found: params.len(),
            });
        }

        let key = CacheKey::new(template.id, params.clone());
        let statement = Statement::new(template.sql, params);
        let ttl = self.ttl_for(template);

        let executor = &self.executor;
        let statement = &statement;
        let value = self
            .cache
            .get_or_compute(key, ttl, move || async move {
                executor.execute(statement).await
            })
            .await?;
        Ok(value)
    }

    pub fn ttl_for(&self, template: &QueryTemplate) -> Duration {
        Duration::from_secs(self.cache_config.ttl_for(template.id))
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
