use crate::processing::core::errors::QueryError;
use crate::processing::policies::circuit_breaker::CircuitBreaker;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

/// A breaker together with the policy name its rejections are reported under.
#[derive(Debug, Clone)]
pub(crate) struct NamedBreaker {
    name: String,
    breaker: Arc<CircuitBreaker>,
}

impl NamedBreaker {
    pub(crate) fn new(name: String, breaker: Arc<CircuitBreaker>) -> Self {
        Self { name, breaker }
    }
}

/// Runs `next` behind every breaker, the first one outermost. A call must pass all of them.
pub(crate) fn around<'a, T, F>(
    breakers: &'a [NamedBreaker],
    next: F,
) -> BoxFuture<'a, Result<T, QueryError>>
where
    T: Send + 'a,
    F: FnOnce() -> BoxFuture<'a, Result<T, QueryError>> + Send + 'a,
{
    let Some((outer, inner)) = breakers.split_first() else {
        return next();
    };
    Box::pin(async move {
        let rejected = || {
            debug!(policy = %outer.name, "circuit open, failing fast");
            QueryError::CircuitOpen {
                policy: outer.name.clone(),
            }
        };
        outer
            .breaker
            .execute(rejected, move || around(inner, next))
            .await
    })
}
