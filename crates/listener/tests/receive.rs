//! HTTP-level checks for the event receiver.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use handlers::{Dispatcher, HandlerSet};
use notifier::event::encode_message_data;
use notifier::fakes::{InMemoryBlobStore, InMemoryDocumentStore, RecordingNotebookService};
use serde_json::json;
use tower::ServiceExt;

const DS_STATE: &str = r#"{"outputs":{"project-radlab-ds-analytics-id":{"value":"proj-x"},"notebooks-instance-names":{"value":"nb1,nb2"},"notebooks-instance-locations":{"value":"us-central1-a,europe-west4-b"}}}"#;

struct Harness {
    router: axum::Router,
    blobs: Arc<InMemoryBlobStore>,
    notebooks: Arc<RecordingNotebookService>,
}

fn harness() -> Harness {
    let blobs = Arc::new(InMemoryBlobStore::new().with_object(
        "bkt-1",
        "req-1/default.tfstate",
        DS_STATE,
    ));
    let notebooks = Arc::new(RecordingNotebookService::new());
    let dispatcher = Dispatcher::new(
        Arc::new(InMemoryDocumentStore::new()),
        blobs.clone(),
        HandlerSet::standard(notebooks.clone()),
    );
    Harness {
        router: listener::router(Arc::new(dispatcher)),
        blobs,
        notebooks,
    }
}

fn message_data(trigger_name: &str, status: &str) -> String {
    encode_message_data(&json!({
        "status": status,
        "substitutions": {
            "TRIGGER_NAME": trigger_name,
            "_REQUEST_ID": "req-1",
            "_STORAGE_BUCKET": "bkt-1"
        }
    }))
}

fn binary_request(data: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .header("ce-id", "evt-1")
        .header("ce-specversion", "1.0")
        .header("ce-type", "google.cloud.pubsub.topic.v1.messagePublished")
        .header("ce-source", "//pubsub.googleapis.com/projects/p/topics/cloud-builds")
        .body(Body::from(
            json!({
                "message": {"data": data, "messageId": "m-1"},
                "subscription": "projects/p/subscriptions/rad-lab"
            })
            .to_string(),
        ))
        .expect("request")
}

#[tokio::test]
async fn handled_event_answers_no_content() {
    let harness = harness();

    let response = harness
        .router
        .clone()
        .oneshot(binary_request(&message_data(
            "rad-lab-launch-data-science-pub-sub",
            "SUCCESS",
        )))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let lookups: Vec<String> = harness
        .notebooks
        .calls()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lookups,
        vec![
            "projects/proj-x/locations/us-central1-a/instances/nb1",
            "projects/proj-x/locations/europe-west4-b/instances/nb2",
        ]
    );
}

#[tokio::test]
async fn structured_event_is_accepted() {
    let harness = harness();
    let body = json!({
        "specversion": "1.0",
        "id": "evt-2",
        "type": "google.cloud.pubsub.topic.v1.messagePublished",
        "source": "//pubsub.googleapis.com/projects/p/topics/cloud-builds",
        "data": {"message": {"data": message_data("rad-lab-launch-genomics-dsub", "FAILURE")}}
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/cloudevents+json")
        .body(Body::from(body.to_string()))
        .expect("request");

    let response = harness.router.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(harness.blobs.calls().len(), 1);
}

#[tokio::test]
async fn unknown_trigger_answers_no_content_without_fetching() {
    let harness = harness();

    let response = harness
        .router
        .clone()
        .oneshot(binary_request(&message_data("deploy-docs", "SUCCESS")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(harness.blobs.calls().is_empty());
}

#[tokio::test]
async fn relay_errors_answer_internal_server_error() {
    let harness = harness();

    let response = harness
        .router
        .clone()
        .oneshot(binary_request("!!! not base64 !!!"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert!(String::from_utf8_lossy(&body).contains("base64"));
}

#[tokio::test]
async fn non_cloud_event_body_is_a_bad_request() {
    let harness = harness();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"hello": "world"}"#))
        .expect("request");

    let response = harness.router.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_ok() {
    let harness = harness();
    let request = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .expect("request");

    let response = harness.router.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(value, json!({"status": "ok"}));
}
