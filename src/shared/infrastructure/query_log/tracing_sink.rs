use crate::shared::infrastructure::query_log::{QueryLogRecord, QueryLogSink, QueryOutcome};
use tracing::{info, warn};

/// Writes query log records as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingQueryLogSink;

impl QueryLogSink for TracingQueryLogSink {
    fn record(&self, record: &QueryLogRecord) {
        match &record.outcome {
            QueryOutcome::Succeeded => info!(
                context_id = %record.context_id,
                query = record.query,
                payload = %record.payload,
                attempts = record.attempts,
                elapsed_ms = record.elapsed_ms(),
                "query executed"
            ),
            QueryOutcome::FallbackApplied { cause } => warn!(
                context_id = %record.context_id,
                query = record.query,
                payload = %record.payload,
                attempts = record.attempts,
                elapsed_ms = record.elapsed_ms(),
                cause = %cause,
                "query answered by fallback"
            ),
            QueryOutcome::Failed { error } => warn!(
                context_id = %record.context_id,
                query = record.query,
                payload = %record.payload,
                attempts = record.attempts,
                elapsed_ms = record.elapsed_ms(),
                error = %error,
                "query failed"
            ),
        }
    }
}
