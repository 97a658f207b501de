use async_graphql::{Context, Object, Result as GqlResult};

use crate::modules::people::core::person::Person;
use crate::modules::people::use_cases::get_people::query::GetPeople;
use crate::shell::graphql::query_error;
use crate::shell::state::AppState;

#[derive(Default)]
pub struct PeopleQuery;

#[Object]
impl PeopleQuery {
    async fn people(&self, context: &Context<'_>) -> GqlResult<Vec<Person>> {
        let state = context.data_unchecked::<AppState>();
        state.processor.execute(GetPeople).await.map_err(query_error)
    }
}
