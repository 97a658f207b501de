use axum::{extract::State, response::Response};

use crate::modules::greetings::use_cases::get_random_quote::query::GetRandomQuote;
use crate::processing::core::query::QueryContext;
use crate::shell::http::query_response;
use crate::shell::state::AppState;

pub async fn handle(State(state): State<AppState>) -> Response {
    let context = QueryContext::new();
    let result = state.processor.execute_in(&GetRandomQuote, &context).await;
    query_response(result, &context)
}
