use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::modules::greetings::use_cases::get_greeting::query::{GetAwsGreeting, GetAzureGreeting};
use crate::processing::core::query::QueryContext;
use crate::shell::http::query_response;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct GreetingParams {
    pub name: Option<String>,
}

impl GreetingParams {
    fn name(self) -> String {
        self.name.unwrap_or_else(|| "World".to_string())
    }
}

pub async fn handle_azure(
    State(state): State<AppState>,
    Query(params): Query<GreetingParams>,
) -> Response {
    let context = QueryContext::new();
    let query = GetAzureGreeting {
        name: params.name(),
    };
    let result = state.processor.execute_in(&query, &context).await;
    query_response(result, &context)
}

pub async fn handle_aws(
    State(state): State<AppState>,
    Query(params): Query<GreetingParams>,
) -> Response {
    let context = QueryContext::new();
    let query = GetAwsGreeting {
        name: params.name(),
    };
    let result = state.processor.execute_in(&query, &context).await;
    query_response(result, &context)
}

#[cfg(test)]
mod get_greeting_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::processing::registry::remote::{AWS_API_KEY_HEADER, AZURE_FUNCTIONS_KEY_HEADER};
    use crate::shared::infrastructure::transport::Credential;
    use crate::shell::state::AppState;
    use crate::tests::fixtures::{AWS_BASE_URI, greetings_transport, sample_api};

    use super::{handle_aws, handle_azure};

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/greeting/azure", get(handle_azure))
            .route("/api/greeting/aws", get(handle_aws))
            .with_state(state)
    }

    async fn body_of(state: AppState, uri: &str) -> (StatusCode, String) {
        let response = app(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn it_should_greet_from_azure_with_the_functions_key() {
        let api = sample_api(greetings_transport());
        let (status, body) = body_of(api.state.clone(), "/api/greeting/azure?name=Ada").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#""Hello from Azure, Ada!""#);
        assert_eq!(
            api.transport.calls()[0].credential,
            Credential::header(AZURE_FUNCTIONS_KEY_HEADER, "azure-functions-key")
        );
    }

    #[tokio::test]
    async fn it_should_greet_from_aws_with_the_api_key() {
        let api = sample_api(greetings_transport());
        let (status, body) = body_of(api.state.clone(), "/api/greeting/aws").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#""Hello from AWS, World!""#);
        let call = &api.transport.calls()[0];
        assert_eq!(call.endpoint_uri, AWS_BASE_URI);
        assert_eq!(call.operation, "darkerHelloWorld");
        assert_eq!(
            call.credential,
            Credential::header(AWS_API_KEY_HEADER, "aws-api-key")
        );
    }

    #[tokio::test]
    async fn it_should_return_502_then_503_when_aws_is_unreachable() {
        let mut transport = greetings_transport();
        transport.toggle_offline();
        let api = sample_api(transport);

        let (status, _) = body_of(api.state.clone(), "/api/greeting/aws").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.transport.calls().len(), 4);

        // The exhausted retries opened the generic breaker.
        let (status, _) = body_of(api.state.clone(), "/api/greeting/aws").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.transport.calls().len(), 4);
    }
}
