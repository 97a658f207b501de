use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::json;

use crate::modules::greetings::use_cases::get_greeting::inbound::http as greeting_http;
use crate::modules::greetings::use_cases::get_random_quote::inbound::http as quote_http;
use crate::modules::people::core::person::PERSON_NOT_FOUND;
use crate::modules::people::use_cases::get_people::inbound::http as people_http;
use crate::modules::people::use_cases::get_person_name::inbound::http as person_name_http;
use crate::processing::core::errors::QueryError;
use crate::processing::core::query::QueryContext;
use crate::shell::state::AppState;

/// Set on responses answered by a fallback instead of the real target.
pub const FALLBACK_APPLIED_HEADER: &str = "x-fallback-applied";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/people", get(people_http::handle))
        .route("/api/people/{person_id}", get(person_name_http::handle))
        .route("/api/quote", get(quote_http::handle))
        .route("/api/greeting/azure", get(greeting_http::handle_azure))
        .route("/api/greeting/aws", get(greeting_http::handle_aws))
        .with_state(state)
}

pub fn status_of(error: &QueryError) -> StatusCode {
    match error.root_cause() {
        QueryError::CircuitOpen { .. } => StatusCode::SERVICE_UNAVAILABLE,
        QueryError::Handler(failure) if failure.kind() == PERSON_NOT_FOUND => StatusCode::NOT_FOUND,
        QueryError::Remote(_) => StatusCode::BAD_GATEWAY,
        QueryError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        QueryError::NotRegistered { .. } => StatusCode::NOT_IMPLEMENTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn query_response<T: Serialize>(result: Result<T, QueryError>, context: &QueryContext) -> Response {
    match result {
        Ok(value) if context.fallback_applied() => {
            ([(FALLBACK_APPLIED_HEADER, "true")], Json(value)).into_response()
        }
        Ok(value) => Json(value).into_response(),
        Err(error) => (status_of(&error), Json(json!({ "error": error.to_string() }))).into_response(),
    }
}
