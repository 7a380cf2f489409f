//! End-to-end dispatch checks against in-memory ports.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use handlers::{Dispatcher, FlavorHandler, HandlerContext, HandlerSet, Outcome};
use notifier::fakes::{InMemoryBlobStore, InMemoryDocumentStore, RecordingNotebookService};
use notifier::{
    CloudEvent, DecodeError, FetchErrorKind, Flavor, MessagePublishedData, PubsubMessage,
    RelayError, Service,
};
use serde_json::json;

const DS_STATE: &str = r#"{"outputs":{"project-radlab-ds-analytics-id":{"value":"proj-x"},"notebooks-instance-names":{"value":"nb1"},"notebooks-instance-locations":{"value":"us-central1"}}}"#;

fn build_event(trigger_name: &str, status: &str) -> CloudEvent {
    let payload = json!({
        "id": "build-1",
        "status": status,
        "substitutions": {
            "TRIGGER_NAME": trigger_name,
            "_REQUEST_ID": "req-1",
            "_STORAGE_BUCKET": "bkt-1"
        }
    });
    CloudEvent::from_data(MessagePublishedData {
        message: PubsubMessage::from_json(&payload),
        subscription: Some("projects/p/subscriptions/rad-lab-builds".to_string()),
    })
}

struct Harness {
    documents: Arc<InMemoryDocumentStore>,
    blobs: Arc<InMemoryBlobStore>,
    notebooks: Arc<RecordingNotebookService>,
}

impl Harness {
    fn new(state: &str) -> Self {
        Self {
            documents: Arc::new(
                InMemoryDocumentStore::new()
                    .with_document("rad-lab-requests/req-1", json!({"requester": "ana"})),
            ),
            blobs: Arc::new(InMemoryBlobStore::new().with_object(
                "bkt-1",
                "req-1/default.tfstate",
                state,
            )),
            notebooks: Arc::new(RecordingNotebookService::new()),
        }
    }

    fn standard(&self) -> Dispatcher {
        self.with_handlers(HandlerSet::standard(self.notebooks.clone()))
    }

    fn with_handlers(&self, handlers: HandlerSet) -> Dispatcher {
        Dispatcher::new(self.documents.clone(), self.blobs.clone(), handlers)
    }

    fn lookups(&self) -> Vec<String> {
        self.notebooks
            .calls()
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

/// Records which flavor's handler ran.
struct Recorder {
    flavor: Flavor,
    seen: Arc<Mutex<Vec<Flavor>>>,
}

#[async_trait]
impl FlavorHandler for Recorder {
    async fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<(), RelayError> {
        self.seen.lock().unwrap().push(self.flavor);
        Ok(())
    }
}

fn recording_set(seen: &Arc<Mutex<Vec<Flavor>>>) -> HandlerSet {
    Flavor::ALL.into_iter().fold(HandlerSet::new(), |set, flavor| {
        set.with_handler(
            flavor,
            Arc::new(Recorder {
                flavor,
                seen: Arc::clone(seen),
            }),
        )
    })
}

#[tokio::test]
async fn unknown_trigger_is_ignored_without_fetching() {
    let harness = Harness::new(DS_STATE);
    let dispatcher = harness.standard();

    for trigger in ["deploy-website", "rad-lab-launch-data-science", ""] {
        let outcome = dispatcher
            .dispatch(&build_event(trigger, "SUCCESS"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Ignored {
                trigger_name: Some(trigger.to_string())
            }
        );
    }

    assert!(harness.documents.calls().is_empty());
    assert!(harness.blobs.calls().is_empty());
    assert!(harness.lookups().is_empty());
}

#[tokio::test]
async fn build_without_trigger_name_is_ignored() {
    let harness = Harness::new(DS_STATE);
    let event = CloudEvent::from_data(MessagePublishedData {
        message: PubsubMessage::from_json(&json!({"status": "SUCCESS", "substitutions": {}})),
        subscription: None,
    });

    let outcome = harness.standard().dispatch(&event).await.unwrap();

    assert_eq!(outcome, Outcome::Ignored { trigger_name: None });
    assert!(harness.documents.calls().is_empty());
}

#[tokio::test]
async fn each_trigger_runs_exactly_its_own_handler() {
    for flavor in Flavor::ALL {
        let harness = Harness::new("{}");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = harness.with_handlers(recording_set(&seen));

        let outcome = dispatcher
            .dispatch(&build_event(flavor.trigger_name(), "SUCCESS"))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Handled { flavor });
        assert_eq!(*seen.lock().unwrap(), vec![flavor]);
    }
}

#[tokio::test]
async fn state_is_fetched_from_the_request_prefix_after_the_document() {
    let harness = Harness::new("{}");
    harness
        .standard()
        .dispatch(&build_event("rad-lab-launch-genomics-cromwell", "SUCCESS"))
        .await
        .unwrap();

    let documents: Vec<String> = harness
        .documents
        .calls()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(documents, vec!["rad-lab-requests/req-1"]);

    let blobs = harness.blobs.calls();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].0.as_str(), "bkt-1");
    assert_eq!(blobs[0].1.as_str(), "req-1/default.tfstate");
}

#[tokio::test]
async fn data_science_success_looks_up_the_provisioned_notebook() {
    let harness = Harness::new(DS_STATE);

    let outcome = harness
        .standard()
        .dispatch(&build_event("rad-lab-launch-data-science-pub-sub", "SUCCESS"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Handled {
            flavor: Flavor::DataScience
        }
    );
    assert_eq!(
        harness.lookups(),
        vec!["projects/proj-x/locations/us-central1/instances/nb1"]
    );
}

#[tokio::test]
async fn data_science_failure_makes_no_lookups() {
    let harness = Harness::new(DS_STATE);

    harness
        .standard()
        .dispatch(&build_event("rad-lab-launch-data-science-pub-sub", "FAILURE"))
        .await
        .unwrap();

    assert!(harness.lookups().is_empty());
}

fn build_event_without_status(trigger_name: &str) -> CloudEvent {
    let payload = json!({
        "substitutions": {
            "TRIGGER_NAME": trigger_name,
            "_REQUEST_ID": "req-1",
            "_STORAGE_BUCKET": "bkt-1"
        }
    });
    CloudEvent::from_data(MessagePublishedData {
        message: PubsubMessage::from_json(&payload),
        subscription: None,
    })
}

#[tokio::test]
async fn build_without_status_is_handled_as_not_successful() {
    let harness = Harness::new(DS_STATE);
    let dispatcher = harness.standard();

    let outcome = dispatcher
        .dispatch(&build_event_without_status("rad-lab-launch-alpha-fold-pub-sub"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Handled {
            flavor: Flavor::AlphaFold
        }
    );

    let outcome = dispatcher
        .dispatch(&build_event_without_status("rad-lab-launch-data-science-pub-sub"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Handled {
            flavor: Flavor::DataScience
        }
    );
    assert!(harness.lookups().is_empty());
}

#[tokio::test]
async fn missing_state_object_fails_before_any_handler_runs() {
    for flavor in Flavor::ALL {
        let harness = Harness::new("{}");
        let blobs = Arc::new(InMemoryBlobStore::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher =
            Dispatcher::new(harness.documents.clone(), blobs.clone(), recording_set(&seen));

        let err = dispatcher
            .dispatch(&build_event(flavor.trigger_name(), "SUCCESS"))
            .await
            .unwrap_err();

        match err {
            RelayError::Fetch(e) => {
                assert_eq!(e.service, Service::BlobStore);
                assert_eq!(e.kind, FetchErrorKind::NotFound);
            }
            other => panic!("expected blob store fetch error, got {other:?}"),
        }
        assert_eq!(blobs.calls().len(), 1);
        assert!(seen.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn document_store_failure_stops_before_the_download() {
    let harness = Harness::new(DS_STATE);
    let documents = Arc::new(InMemoryDocumentStore::new().failing(FetchErrorKind::PermissionDenied));
    let dispatcher = Dispatcher::new(
        documents,
        harness.blobs.clone(),
        HandlerSet::standard(harness.notebooks.clone()),
    );

    let err = dispatcher
        .dispatch(&build_event("rad-lab-launch-alpha-fold-pub-sub", "SUCCESS"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Fetch(ref e) if e.service == Service::DocumentStore));
    assert!(harness.blobs.calls().is_empty());
}

#[tokio::test]
async fn missing_request_document_is_passed_through() {
    let harness = Harness::new("{}");
    let documents = Arc::new(InMemoryDocumentStore::new());
    let dispatcher = Dispatcher::new(
        documents.clone(),
        harness.blobs.clone(),
        HandlerSet::standard(harness.notebooks.clone()),
    );

    let outcome = dispatcher
        .dispatch(&build_event("rad-lab-launch-genomics-dsub", "SUCCESS"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Handled {
            flavor: Flavor::GenomicsDsub
        }
    );
    assert_eq!(documents.calls().len(), 1);
}

#[tokio::test]
async fn malformed_state_is_a_decode_error() {
    let harness = Harness::new("provider \"google\" {}");

    let err = harness
        .standard()
        .dispatch(&build_event("rad-lab-launch-silicon-design", "SUCCESS"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Decode(DecodeError::Json(_))));
}

#[tokio::test]
async fn malformed_message_data_fails_before_any_fetch() {
    let harness = Harness::new(DS_STATE);
    let mut event = build_event("rad-lab-launch-data-science-pub-sub", "SUCCESS");
    event.data.message.data = Some("%%% not base64 %%%".to_string());

    let err = harness.standard().dispatch(&event).await.unwrap_err();

    assert!(matches!(err, RelayError::Decode(DecodeError::Base64(_))));
    assert!(harness.documents.calls().is_empty());
    assert!(harness.blobs.calls().is_empty());
}

#[tokio::test]
async fn unregistered_flavor_is_reported() {
    let harness = Harness::new("{}");
    let dispatcher = harness.with_handlers(HandlerSet::new());

    let err = dispatcher
        .dispatch(&build_event("rad-lab-launch-alpha-fold-pub-sub", "SUCCESS"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RelayError::NoHandler {
            flavor: Flavor::AlphaFold
        }
    ));
}
