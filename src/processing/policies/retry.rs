use crate::processing::core::errors::QueryError;
use crate::processing::core::query::QueryContext;
use crate::processing::policies::predicate::FailurePredicate;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Fixed backoff schedule. One attempt per delay plus the initial attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    predicate: FailurePredicate,
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(predicate: FailurePredicate, delays: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            predicate,
            delays: delays.into_iter().collect(),
        }
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    pub fn predicate(&self) -> &FailurePredicate {
        &self.predicate
    }

    /// Runs `operation` until it succeeds, fails with a non-qualifying error, or the schedule is
    /// used up. Attempts never overlap; each waits out its full delay first.
    pub async fn execute<T, F, Fut>(
        &self,
        operation_name: &str,
        context: &QueryContext,
        mut operation: F,
    ) -> Result<T, QueryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        let mut attempt = 0;
        loop {
            let failure = match operation().await {
                Ok(result) => return Ok(result),
                Err(failure) => failure,
            };
            attempt += 1;
            if !self.predicate.qualifies(&failure) {
                return Err(failure);
            }
            let Some(delay) = self.delays.get(attempt - 1).copied() else {
                error!(
                    "Failed to execute '{}' after {} attempts: {}",
                    operation_name, attempt, failure
                );
                return Err(QueryError::RetryExhausted {
                    attempts: attempt,
                    last: Box::new(failure),
                });
            };
            warn!(
                "Query '{}' failed. Retrying in {:?} (Attempt {}/{}): {}",
                operation_name,
                delay,
                attempt,
                self.max_attempts(),
                failure
            );
            context.sleep(delay).await?;
        }
    }
}

#[cfg(test)]
mod retry_policy_tests {
    use super::*;
    use crate::processing::core::errors::HandlerFailure;
    use rstest::{fixture, rstest};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[fixture]
    fn policy() -> RetryPolicy {
        RetryPolicy::new(
            FailurePredicate::any(),
            [10, 20, 30].map(Duration::from_millis),
        )
    }

    #[rstest]
    fn it_should_allow_one_attempt_more_than_the_schedule_length(policy: RetryPolicy) {
        assert_eq!(policy.max_attempts(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_succeed_after_transient_failures(policy: RetryPolicy) {
        let calls = &AtomicUsize::new(0);
        let started = Instant::now();
        let result = policy
            .execute("flaky", &QueryContext::new(), || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(QueryError::Handler(HandlerFailure::new("transient")))
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_wrap_the_last_failure_when_exhausted(policy: RetryPolicy) {
        let calls = &AtomicUsize::new(0);
        let result: Result<(), _> = policy
            .execute("broken", &QueryContext::new(), || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(QueryError::Handler(HandlerFailure::new(format!("failure {n}"))))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            result,
            Err(QueryError::RetryExhausted {
                attempts: 4,
                last: Box::new(QueryError::Handler(HandlerFailure::new("failure 3"))),
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_retry_failures_outside_the_predicate() {
        let policy = RetryPolicy::new(
            FailurePredicate::handler_kind("transient"),
            [Duration::from_millis(10)],
        );
        let calls = &AtomicUsize::new(0);
        let result: Result<(), _> = policy
            .execute("permanent", &QueryContext::new(), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(QueryError::Handler(HandlerFailure::of_kind("permanent", "no")))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            result,
            Err(QueryError::Handler(HandlerFailure::of_kind("permanent", "no")))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_stop_waiting_when_the_caller_cancels(policy: RetryPolicy) {
        let context = QueryContext::new();
        let token = context.cancellation_token().clone();
        let result: Result<(), _> = policy
            .execute("cancelled", &context, || {
                token.cancel();
                async { Err(QueryError::Handler(HandlerFailure::new("transient"))) }
            })
            .await;
        assert_eq!(result, Err(QueryError::Cancelled));
    }
}
