use async_graphql::{Context, Object, Result as GqlResult};

use crate::modules::people::use_cases::get_person_name::query::GetPersonName;
use crate::shell::graphql::query_error;
use crate::shell::state::AppState;

#[derive(Default)]
pub struct PersonNameQuery;

#[Object]
impl PersonNameQuery {
    async fn person_name(&self, context: &Context<'_>, person_id: u32) -> GqlResult<String> {
        let state = context.data_unchecked::<AppState>();
        state
            .processor
            .execute(GetPersonName::new(person_id))
            .await
            .map_err(query_error)
    }
}
