use crate::processing::core::errors::QueryError;
use crate::processing::core::query::{Query, QueryContext};
use crate::processing::registry::Fallback;
use futures::future::BoxFuture;
use tracing::warn;

/// Substitutes the registration's fallback result for a definitive failure.
///
/// Cancellation is passed through: the caller that gave up gets no degraded answer.
pub(crate) async fn around<'a, Q, F>(
    fallback: Option<&Fallback<Q>>,
    query: &Q,
    context: &QueryContext,
    next: F,
) -> Result<Q::Result, QueryError>
where
    Q: Query,
    F: FnOnce() -> BoxFuture<'a, Result<Q::Result, QueryError>>,
{
    let result = next().await;
    let Some(fallback) = fallback else {
        return result;
    };
    match result {
        Err(error) if !error.is_cancellation() => {
            warn!(
                context_id = %context.id(),
                query = Q::name(),
                error = %error,
                "query failed, answering with its fallback"
            );
            let degraded = fallback(query, &error);
            context.record_fallback(error);
            Ok(degraded)
        }
        other => other,
    }
}
