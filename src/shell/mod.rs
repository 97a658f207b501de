// Composition root and hosts of the sample API.
//
// Responsibilities:
// - Compose the query processor from configuration and collaborators (composition).
// - Expose the queries over HTTP and GraphQL (http, graphql).
// - Initialise tracing for the binary (telemetry).

pub mod composition;
pub mod graphql;
pub mod http;
pub mod state;
pub mod telemetry;

use axum::{Extension, Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::shell::state::AppState;

/// HTTP routes, the GraphQL endpoint at `/gql` and request tracing.
pub fn app(state: AppState) -> Router {
    let schema = graphql::schema(state.clone());
    http::router(state)
        .route("/gql", get(graphql::graphiql).post(graphql::graphql))
        .layer(Extension(schema))
        .layer(TraceLayer::new_for_http())
}
