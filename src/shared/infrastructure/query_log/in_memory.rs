// In memory implementation of the QueryLogSink port.
//
// Purpose
// - Let tests assert on exactly what the logging decorator recorded.

use crate::shared::infrastructure::query_log::{QueryLogRecord, QueryLogSink};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryQueryLogSink {
    records: Mutex<Vec<QueryLogRecord>>,
}

impl InMemoryQueryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<QueryLogRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl QueryLogSink for InMemoryQueryLogSink {
    fn record(&self, record: &QueryLogRecord) {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record.clone());
    }
}
