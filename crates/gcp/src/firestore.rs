//! Firestore document reads over the v1 REST API.

use async_trait::async_trait;
use notifier::{
    DocumentPath, DocumentStore, FetchError, FetchErrorKind, RequestRecord, Service, Timestamp,
};
use serde::Deserialize;

use crate::http;
use crate::Credentials;

/// Production Firestore endpoint.
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Database ID used when none is configured.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Subset of the Firestore `Document` resource the relay keeps.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirestoreDocument {
    #[serde(default)]
    fields: Option<serde_json::Value>,
    #[serde(default)]
    update_time: Option<String>,
}

/// Reads request documents from a Firestore database.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
    project_id: String,
}

impl FirestoreClient {
    /// Creates a client for the default database of `project_id`.
    pub fn new(project_id: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client: http::build_client(),
            credentials,
            endpoint: DEFAULT_FIRESTORE_ENDPOINT.to_string(),
            project_id: project_id.into(),
        }
    }

    /// Overrides the API endpoint (e.g. an emulator at `http://localhost:8080`).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_document(&self, path: &DocumentPath) -> Result<RequestRecord, FetchError> {
        let resource = path.as_str();
        let segments = [
            "v1",
            "projects",
            self.project_id.as_str(),
            "databases",
            DEFAULT_DATABASE,
            "documents",
        ]
        .into_iter()
        .chain(resource.split('/'));
        let url = http::resource_url(&self.endpoint, segments, Service::DocumentStore, resource)?;

        let Some(response) = http::get(
            &self.client,
            &self.credentials,
            url,
            Service::DocumentStore,
            resource,
            true,
        )
        .await?
        else {
            return Ok(RequestRecord::missing(path.clone()));
        };

        let document: FirestoreDocument = response.json().await.map_err(|e| {
            FetchError::new(
                Service::DocumentStore,
                FetchErrorKind::InvalidResponse,
                resource,
                format!("invalid document: {e}"),
            )
        })?;

        // An existing document with no fields has no `fields` key at all.
        let fields = document
            .fields
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        let record = RequestRecord::found(path.clone(), fields);
        Ok(match document.update_time.as_deref().and_then(Timestamp::parse_rfc3339) {
            Some(update_time) => record.with_update_time(update_time),
            None => record,
        })
    }
}
