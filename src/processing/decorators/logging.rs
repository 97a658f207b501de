use crate::processing::core::errors::QueryError;
use crate::processing::core::query::{Query, QueryContext};
use crate::shared::infrastructure::query_log::{QueryLogRecord, QueryLogSink, QueryOutcome};
use chrono::Utc;
use futures::future::BoxFuture;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Records one log entry once the inner stages have settled on the caller-visible outcome.
pub(crate) async fn around<'a, Q, F>(
    sink: &dyn QueryLogSink,
    query: &Q,
    context: &QueryContext,
    next: F,
) -> Result<Q::Result, QueryError>
where
    Q: Query,
    F: FnOnce() -> BoxFuture<'a, Result<Q::Result, QueryError>>,
{
    let started_at = Utc::now();
    let payload = serde_json::to_string(query)
        .unwrap_or_else(|error| format!("<payload not serializable: {error}>"));

    let result = next().await;

    let outcome = match (&result, context.fallback_cause()) {
        (Ok(_), None) => QueryOutcome::Succeeded,
        (Ok(_), Some(cause)) => QueryOutcome::FallbackApplied {
            cause: cause.to_string(),
        },
        (Err(error), _) => QueryOutcome::Failed {
            error: error.to_string(),
        },
    };
    let record = QueryLogRecord {
        context_id: context.id(),
        query: Q::name(),
        payload,
        started_at,
        finished_at: Utc::now(),
        attempts: context.attempts(),
        outcome,
    };
    if panic::catch_unwind(AssertUnwindSafe(|| sink.record(&record))).is_err() {
        warn!(
            context_id = %record.context_id,
            query = record.query,
            "query log sink panicked, record dropped"
        );
    }
    result
}
