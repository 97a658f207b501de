// Query log port.
//
// Purpose
// - Receive one structured record per executed query from the logging decorator.
//
// Boundaries
// - Sinks return nothing. A sink that fails must not affect the query that was logged.

pub mod in_memory;
pub mod tracing_sink;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Succeeded,
    FallbackApplied { cause: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryLogRecord {
    pub context_id: Uuid,
    pub query: &'static str,
    pub payload: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub attempts: usize,
    pub outcome: QueryOutcome,
}

impl QueryLogRecord {
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

pub trait QueryLogSink: Send + Sync {
    fn record(&self, record: &QueryLogRecord);
}
