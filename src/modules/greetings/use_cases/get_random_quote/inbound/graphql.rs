use async_graphql::{Context, Object, Result as GqlResult};

use crate::modules::greetings::use_cases::get_random_quote::query::{GetRandomQuote, RandomQuote};
use crate::shell::graphql::query_error;
use crate::shell::state::AppState;

#[derive(Default)]
pub struct RandomQuoteQuery;

#[Object]
impl RandomQuoteQuery {
    async fn random_quote(&self, context: &Context<'_>) -> GqlResult<RandomQuote> {
        let state = context.data_unchecked::<AppState>();
        state
            .processor
            .execute(GetRandomQuote)
            .await
            .map_err(query_error)
    }
}
