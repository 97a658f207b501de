use crate::shared::infrastructure::query_log::QueryOutcome;
use crate::shell;
use crate::modules::people::core::person::SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER;
use crate::shell::http::FALLBACK_APPLIED_HEADER;
use crate::tests::fixtures::{greetings_transport, sample_api};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn serves_people_and_greetings_over_graphql() {
    let api = sample_api(greetings_transport());
    let request = Request::post("/gql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "query": r#"{ people { id name } personName(personId: 2) awsGreeting(name: "Ada") }"#
            })
            .to_string(),
        ))
        .unwrap();

    let response = shell::app(api.state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        json["data"],
        json!({
            "people": [
                { "id": 1, "name": "Jonny" },
                { "id": 2, "name": "Mary" },
                { "id": 3, "name": "Steve" }
            ],
            "personName": "Mary",
            "awsGreeting": "Hello from AWS, Ada!"
        })
    );
    assert_eq!(api.log.records().len(), 3);
}

#[tokio::test]
async fn a_corrupted_store_keeps_people_degraded_while_names_recover() {
    let api = sample_api(greetings_transport());
    let app = shell::app(api.state.clone());
    let get = |uri: &'static str| {
        let app = app.clone();
        async move {
            app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap()
        }
    };

    api.people.toggle_corrupted();
    let response = get("/api/people").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(FALLBACK_APPLIED_HEADER).is_some());

    // Past the generic breaker's half a second, well inside the scoped breaker's five.
    api.people.toggle_corrupted();
    tokio::time::sleep(Duration::from_millis(600)).await;

    let response = get("/api/people/3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get("/api/people").await;
    assert!(response.headers().get(FALLBACK_APPLIED_HEADER).is_some());
    let records = api.log.records();
    let Some(QueryOutcome::FallbackApplied { cause }) = records.last().map(|r| &r.outcome) else {
        panic!("expected a fallback outcome, got {:?}", records.last());
    };
    assert!(cause.contains(SOMETHING_WENT_TERRIBLY_WRONG_CIRCUIT_BREAKER));
}
