//! Batch executor.

use crate::types::ErrorRecord;
use crate::Result;
use futures::{FutureExt, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Result of one batch item under continue-on-failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome<R> {
    Ok(R),
    Failed(ErrorRecord),
}

impl<R> ItemOutcome<R> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ItemOutcome::Ok(_))
    }

    pub fn ok(self) -> Option<R> {
        match self {
            ItemOutcome::Ok(r) => Some(r),
            ItemOutcome::Failed(_) => None,
        }
    }
}

/// Outcomes in input order, one per item.
#[derive(Debug, Clone)]
pub struct BatchResult<R> {
    pub outcomes: Vec<ItemOutcome<R>>,
    pub execution_time: Duration,
}

impl<R> BatchResult<R> {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ItemOutcome::is_ok)
    }
    pub fn into_outcomes(self) -> Vec<ItemOutcome<R>> {
        self.outcomes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchStrategy {
    #[default]
    Sequential,
    /// Up to `max_concurrency` items in flight; outcomes keep input order.
    Concurrent { max_concurrency: usize },
}

#[derive(Debug, Clone, Default)]
pub struct BatchExecutorConfig {
    pub strategy: BatchStrategy,
    /// Record failures and keep going instead of aborting on the first one.
    pub continue_on_error: bool,
}

impl BatchExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_strategy(mut self, s: BatchStrategy) -> Self {
        self.strategy = s;
        self
    }
    pub fn with_continue_on_error(mut self, c: bool) -> Self {
        self.continue_on_error = c;
        self
    }
}

#[derive(Debug, Default)]
pub struct BatchExecutor {
    config: BatchExecutorConfig,
}

impl BatchExecutor {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: BatchExecutorConfig) -> Self {
        Self { config }
    }
    pub fn config(&self) -> &BatchExecutorConfig {
        &self.config
    }

    /// Run `executor_fn` over every item.
    ///
    /// Without continue-on-error the first failure is returned, tagged with
    /// its item index, and nothing after it is started (sequential) or
    /// awaited (concurrent).
    pub async fn execute<T, R, F, Fut>(&self, items: Vec<T>, executor_fn: F) -> Result<BatchResult<R>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let start = Instant::now();
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);

        match self.config.strategy {
            BatchStrategy::Sequential => {
                for (i, item) in items.into_iter().enumerate() {
                    let outcome = self.settle(i, executor_fn(item).await)?;
                    outcomes.push(outcome);
                }
            }
            BatchStrategy::Concurrent { max_concurrency } => {
                let mut results = futures::stream::iter(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| executor_fn(item).map(move |r| (i, r))),
                )
                .buffered(max_concurrency.max(1));
                while let Some((i, r)) = results.next().await {
                    outcomes.push(self.settle(i, r)?);
                }
            }
        }

        let result = BatchResult {
            outcomes,
            execution_time: start.elapsed(),
        };
        info!(
            total,
            succeeded = result.success_count(),
            failed = result.failure_count(),
            elapsed_ms = result.execution_time.as_millis() as u64,
            "batch completed"
        );
        Ok(result)
    }

    fn settle<R>(&self, index: usize, r: Result<R>) -> Result<ItemOutcome<R>> {
        match r {
            Ok(r) => Ok(ItemOutcome::Ok(r)),
            Err(e) if self.config.continue_on_error => {
                let e = e.at_item(index);
                warn!(item = index, error = %e, "batch item failed, continuing");
                Ok(ItemOutcome::Failed(ErrorRecord::new(&e)))
            }
            Err(e) => Err(e.at_item(index)),
        }
    }
}
