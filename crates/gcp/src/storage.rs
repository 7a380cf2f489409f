//! Cloud Storage object downloads over the JSON API.

use async_trait::async_trait;
use notifier::{BlobStore, BucketName, FetchError, FetchErrorKind, ObjectKey, Service};

use crate::http;
use crate::Credentials;

/// Production Cloud Storage endpoint.
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";

/// Downloads Terraform state objects from Cloud Storage.
#[derive(Debug, Clone)]
pub struct CloudStorageClient {
    client: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
}

impl CloudStorageClient {
    /// Creates a client for the production endpoint.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: http::build_client(),
            credentials,
            endpoint: DEFAULT_STORAGE_ENDPOINT.to_string(),
        }
    }

    /// Overrides the API endpoint (e.g. a fake GCS server).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl BlobStore for CloudStorageClient {
    async fn download(&self, bucket: &BucketName, key: &ObjectKey) -> Result<Vec<u8>, FetchError> {
        let resource = format!("gs://{bucket}/{key}");
        let mut url = http::resource_url(
            &self.endpoint,
            ["storage", "v1", "b", bucket.as_str(), "o", key.as_str()],
            Service::BlobStore,
            &resource,
        )?;
        url.query_pairs_mut().append_pair("alt", "media");

        let response = http::get(
            &self.client,
            &self.credentials,
            url,
            Service::BlobStore,
            &resource,
            false,
        )
        .await?
        .ok_or_else(|| {
            FetchError::new(
                Service::BlobStore,
                FetchErrorKind::NotFound,
                resource.as_str(),
                "object not found",
            )
        })?;

        let bytes = response.bytes().await.map_err(|e| {
            FetchError::new(
                Service::BlobStore,
                FetchErrorKind::Transport,
                resource.as_str(),
                format!("download interrupted: {e}"),
            )
        })?;
        tracing::debug!(object = %resource, size = bytes.len(), "Downloaded object");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::testing::spawn_server;

    const OBJECT_ROUTE: &str = "/storage/v1/b/:bucket/o/:object";

    fn target() -> (BucketName, ObjectKey) {
        let request_id = notifier::RequestId::new("req-1").unwrap();
        (
            BucketName::new("bkt-1").unwrap(),
            ObjectKey::tfstate_for(&request_id),
        )
    }

    #[tokio::test]
    async fn downloads_media_for_the_encoded_object_name() {
        let app = Router::new().route(
            OBJECT_ROUTE,
            get(
                |Path((bucket, object)): Path<(String, String)>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    if bucket == "bkt-1"
                        && object == "req-1/default.tfstate"
                        && query.get("alt").map(String::as_str) == Some("media")
                    {
                        (StatusCode::OK, r#"{"outputs":{}}"#).into_response()
                    } else {
                        (StatusCode::BAD_REQUEST, "unexpected request").into_response()
                    }
                },
            ),
        );
        let client = CloudStorageClient::new(Credentials::Anonymous)
            .with_endpoint(spawn_server(app).await);
        let (bucket, key) = target();

        let bytes = client.download(&bucket, &key).await.unwrap();

        assert_eq!(bytes, br#"{"outputs":{}}"#.to_vec());
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let app = Router::new().route(
            OBJECT_ROUTE,
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": {"code": 404, "message": "No such object: bkt-1/req-1/default.tfstate"}})),
                )
            }),
        );
        let client = CloudStorageClient::new(Credentials::Anonymous)
            .with_endpoint(spawn_server(app).await);
        let (bucket, key) = target();

        let err = client.download(&bucket, &key).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.service, Service::BlobStore);
        assert_eq!(err.resource, "gs://bkt-1/req-1/default.tfstate");
        assert!(err.message.contains("No such object"));
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let app = Router::new().route(
            OBJECT_ROUTE,
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "backend error") }),
        );
        let client = CloudStorageClient::new(Credentials::Anonymous)
            .with_endpoint(spawn_server(app).await);
        let (bucket, key) = target();

        let err = client.download(&bucket, &key).await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Port 9 (discard) is closed on loopback in test environments.
        let client =
            CloudStorageClient::new(Credentials::Anonymous).with_endpoint("http://127.0.0.1:9");
        let (bucket, key) = target();

        let err = client.download(&bucket, &key).await.unwrap_err();

        assert_eq!(err.kind, FetchErrorKind::Transport);
    }
}
