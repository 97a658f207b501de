// Queries, handlers and the per-execution context.
//
// Purpose
// - Describe what the processor executes without knowing where the result comes from.
//
// Responsibilities
// - A query names its result type once, at compile time.
// - A handler computes the result for one query type inside the process.
// - The context carries cancellation, the deadline and what happened during the execution.

use crate::processing::core::errors::{HandlerFailure, QueryError};
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub trait Query: Serialize + Send + Sync + 'static {
    type Result: Send + 'static;

    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn execute(&self, query: &Q, context: &QueryContext) -> Result<Q::Result, HandlerFailure>;
}

#[derive(Debug)]
pub struct QueryContext {
    id: Uuid,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    attempts: AtomicUsize,
    fallback_cause: Mutex<Option<QueryError>>,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            cancellation: CancellationToken::new(),
            deadline: None,
            attempts: AtomicUsize::new(0),
            fallback_cause: Mutex::new(None),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Number of times the target was invoked during this execution.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn fallback_applied(&self) -> bool {
        self.fallback_cause().is_some()
    }

    /// The failure that was absorbed when a fallback result was substituted.
    pub fn fallback_cause(&self) -> Option<QueryError> {
        self.fallback_cause
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_fallback(&self, cause: QueryError) {
        *self
            .fallback_cause
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(cause);
    }

    /// Runs `operation` unless the caller cancels or the deadline passes first.
    pub async fn guard<T, F>(&self, operation: F) -> Result<T, QueryError>
    where
        F: Future<Output = Result<T, QueryError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, operation)
                    .await
                    .unwrap_or(Err(QueryError::DeadlineExceeded)),
                None => operation.await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(QueryError::Cancelled),
            result = bounded => result,
        }
    }

    /// Cancellable, deadline-aware wait used between retry attempts.
    pub async fn sleep(&self, delay: Duration) -> Result<(), QueryError> {
        self.guard(async {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await
    }
}
