use crate::processing::processor::QueryProcessor;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<QueryProcessor>,
}

impl AppState {
    pub fn new(processor: QueryProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }
}
