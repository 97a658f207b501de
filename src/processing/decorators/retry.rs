use crate::processing::core::errors::QueryError;
use crate::processing::core::query::QueryContext;
use crate::processing::policies::retry::RetryPolicy;
use futures::future::BoxFuture;
use tracing::debug;

/// Retries the inner stages under `policy`.
///
/// `RetryExhausted` reports how often the target actually ran. A pass rejected by a breaker
/// nested inside retry is not an invocation.
pub(crate) async fn around<'a, T, F>(
    policy: &RetryPolicy,
    query_name: &str,
    context: &QueryContext,
    next: F,
) -> Result<T, QueryError>
where
    F: FnMut() -> BoxFuture<'a, Result<T, QueryError>>,
{
    let invoked_before = context.attempts();
    let result = policy.execute(query_name, context, next).await;
    let invocations = context.attempts() - invoked_before;
    match result {
        Ok(value) => {
            if invocations > 1 {
                debug!(
                    context_id = %context.id(),
                    query = query_name,
                    attempts = invocations,
                    "query succeeded after retrying"
                );
            }
            Ok(value)
        }
        Err(QueryError::RetryExhausted { last, .. }) => Err(QueryError::RetryExhausted {
            attempts: invocations,
            last,
        }),
        Err(error) => Err(error),
    }
}
