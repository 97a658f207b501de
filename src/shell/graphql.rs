use async_graphql::{EmptyMutation, EmptySubscription, MergedObject, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Extension;
use axum::response::Html;

use crate::modules::greetings::use_cases::get_greeting::inbound::graphql::GreetingQuery;
use crate::modules::greetings::use_cases::get_random_quote::inbound::graphql::RandomQuoteQuery;
use crate::modules::people::use_cases::get_people::inbound::graphql::PeopleQuery;
use crate::modules::people::use_cases::get_person_name::inbound::graphql::PersonNameQuery;
use crate::processing::core::errors::QueryError;
use crate::shell::state::AppState;

#[derive(MergedObject, Default)]
pub struct QueryRoot(PeopleQuery, PersonNameQuery, RandomQuoteQuery, GreetingQuery);

pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn schema(state: AppState) -> AppSchema {
    Schema::build(QueryRoot::default(), EmptyMutation, EmptySubscription)
        .data(state)
        .finish()
}

/// GraphQL error carrying the failure's message.
pub fn query_error(error: QueryError) -> async_graphql::Error {
    async_graphql::Error::new(error.to_string())
}

pub async fn graphql(Extension(schema): Extension<AppSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

pub async fn graphiql() -> Html<String> {
    use async_graphql::http::GraphiQLSource;
    Html(GraphiQLSource::build().endpoint("/gql").finish())
}
