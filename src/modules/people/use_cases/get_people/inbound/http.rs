use axum::{extract::State, response::Response};

use crate::modules::people::use_cases::get_people::query::GetPeople;
use crate::processing::core::query::QueryContext;
use crate::shell::http::query_response;
use crate::shell::state::AppState;

pub async fn handle(State(state): State<AppState>) -> Response {
    let context = QueryContext::new();
    let result = state.processor.execute_in(&GetPeople, &context).await;
    query_response(result, &context)
}
