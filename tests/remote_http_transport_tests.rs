use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use query_pipeline::processing::core::errors::{QueryError, RemoteQueryFailure, TransportFailure};
use query_pipeline::processing::core::query::Query;
use query_pipeline::processing::decorators::DecoratorKind;
use query_pipeline::processing::processor::QueryProcessor;
use query_pipeline::processing::registry::QueryRegistry;
use query_pipeline::processing::registry::remote::{AZURE_FUNCTIONS_KEY_HEADER, RemoteQueryRegistry};
use query_pipeline::processing::remote::serializer::JsonRemoteQuerySerializer;
use query_pipeline::shared::infrastructure::transport::http::HttpTransport;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const FUNCTIONS_KEY: &str = "function-key";

#[derive(Debug, Serialize, Deserialize)]
struct Greet {
    name: String,
}

impl Query for Greet {
    type Result = String;
}

#[derive(Debug, Serialize)]
struct Explode;

impl Query for Explode {
    type Result = String;
}

#[derive(Debug, Serialize)]
struct Dawdle;

impl Query for Dawdle {
    type Result = String;
}

async fn function(
    Path(operation): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let authorized = headers
        .get(AZURE_FUNCTIONS_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        == Some(FUNCTIONS_KEY);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "missing function key").into_response();
    }
    match operation.as_str() {
        "Greet" => {
            let name = body["name"].as_str().unwrap_or("nobody");
            Json(format!("Hello, {name}!")).into_response()
        }
        "Dawdle" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json("too late").into_response()
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
    }
}

async fn serve_functions() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = Router::new().route("/api/{operation}", post(function));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}/api")
}

fn processor(base_uri: &str, functions_key: &str) -> QueryProcessor {
    let transport = Arc::new(HttpTransport::new(Duration::from_millis(200)).unwrap());
    let mut azure = RemoteQueryRegistry::azure_functions(
        Arc::new(JsonRemoteQuerySerializer),
        transport,
        base_uri,
        functions_key,
    );
    // Only the transport is under test; no policies are involved.
    azure
        .register_with::<Greet, _>("Greet", |registration| {
            registration
                .without(DecoratorKind::Retry)
                .without(DecoratorKind::CircuitBreaker)
        })
        .unwrap()
        .register_with::<Explode, _>("Explode", |registration| {
            registration
                .without(DecoratorKind::Retry)
                .without(DecoratorKind::CircuitBreaker)
        })
        .unwrap()
        .register_with::<Dawdle, _>("Dawdle", |registration| {
            registration
                .without(DecoratorKind::Retry)
                .without(DecoratorKind::CircuitBreaker)
        })
        .unwrap();

    let mut registry = QueryRegistry::new();
    registry.add_remote_queries(azure).unwrap();
    QueryProcessor::builder().queries(registry).build().unwrap()
}

fn transport_failure(error: QueryError) -> TransportFailure {
    match error {
        QueryError::Remote(RemoteQueryFailure::Transport { failure, .. }) => failure,
        other => panic!("expected a transport failure, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn it_should_post_the_query_to_the_operation_with_the_function_key() {
    let base_uri = serve_functions().await;
    let processor = processor(&base_uri, FUNCTIONS_KEY);

    let greeting = processor
        .execute(Greet {
            name: "Ada".into(),
        })
        .await;

    assert_eq!(greeting, Ok("Hello, Ada!".to_string()));
}

#[rstest]
#[tokio::test]
async fn it_should_report_a_rejected_credential_as_a_status_failure() {
    let base_uri = serve_functions().await;
    let processor = processor(&base_uri, "wrong-key");

    let error = processor
        .execute(Greet {
            name: "Ada".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        transport_failure(error),
        TransportFailure::Status {
            status: 401,
            body: "missing function key".into(),
        }
    );
}

#[rstest]
#[tokio::test]
async fn it_should_report_a_server_error_as_a_status_failure() {
    let base_uri = serve_functions().await;
    let processor = processor(&base_uri, FUNCTIONS_KEY);

    let error = processor.execute(Explode).await.unwrap_err();

    assert!(matches!(
        transport_failure(error),
        TransportFailure::Status { status: 500, .. }
    ));
}

#[rstest]
#[tokio::test]
async fn it_should_time_out_a_slow_function() {
    let base_uri = serve_functions().await;
    let processor = processor(&base_uri, FUNCTIONS_KEY);

    let error = processor.execute(Dawdle).await.unwrap_err();

    assert_eq!(transport_failure(error), TransportFailure::Timeout);
}

#[rstest]
#[tokio::test]
async fn it_should_report_an_unreachable_backend() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let processor = processor(&format!("http://{address}/api"), FUNCTIONS_KEY);

    let error = processor
        .execute(Greet {
            name: "Ada".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        transport_failure(error),
        TransportFailure::Unreachable(_)
    ));
}
