use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::Serialize;

use crate::modules::people::use_cases::get_person_name::query::GetPersonName;
use crate::processing::core::query::QueryContext;
use crate::shell::http::query_response;
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct PersonName {
    pub id: u32,
    pub name: String,
}

pub async fn handle(State(state): State<AppState>, Path(person_id): Path<u32>) -> Response {
    let context = QueryContext::new();
    let result = state
        .processor
        .execute_in(&GetPersonName::new(person_id), &context)
        .await
        .map(|name| PersonName {
            id: person_id,
            name,
        });
    query_response(result, &context)
}
