use async_graphql::{Context, Object, Result as GqlResult};

use crate::modules::greetings::use_cases::get_greeting::query::{GetAwsGreeting, GetAzureGreeting};
use crate::shell::graphql::query_error;
use crate::shell::state::AppState;

#[derive(Default)]
pub struct GreetingQuery;

#[Object]
impl GreetingQuery {
    async fn azure_greeting(&self, context: &Context<'_>, name: String) -> GqlResult<String> {
        let state = context.data_unchecked::<AppState>();
        state
            .processor
            .execute(GetAzureGreeting { name })
            .await
            .map_err(query_error)
    }

    async fn aws_greeting(&self, context: &Context<'_>, name: String) -> GqlResult<String> {
        let state = context.data_unchecked::<AppState>();
        state
            .processor
            .execute(GetAwsGreeting { name })
            .await
            .map_err(query_error)
    }
}
