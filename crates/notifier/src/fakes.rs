//! In-memory port implementations for tests.
//!
//! Each fake records the calls it receives so tests can assert on the exact
//! sequence of external requests an invocation made.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    BlobStore, BucketName, DocumentPath, DocumentStore, FetchError, FetchErrorKind,
    NotebookInstance, NotebookInstancePath, NotebookService, ObjectKey, RequestRecord, Service,
};

/// A document store backed by a map from path to fields.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: HashMap<String, serde_json::Value>,
    failure: Option<FetchErrorKind>,
    calls: Mutex<Vec<DocumentPath>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document.
    #[must_use]
    pub fn with_document(mut self, path: impl Into<String>, fields: serde_json::Value) -> Self {
        self.documents.insert(path.into(), fields);
        self
    }

    /// Makes every lookup fail with `kind`.
    #[must_use]
    pub fn failing(mut self, kind: FetchErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    /// Returns the paths requested so far, in order.
    pub fn calls(&self) -> Vec<DocumentPath> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(&self, path: &DocumentPath) -> Result<RequestRecord, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.clone());
        }
        if let Some(kind) = self.failure {
            return Err(FetchError::new(
                Service::DocumentStore,
                kind,
                path.as_str(),
                "injected failure",
            ));
        }
        Ok(match self.documents.get(path.as_str()) {
            Some(fields) => RequestRecord::found(path.clone(), fields.clone()),
            None => RequestRecord::missing(path.clone()),
        })
    }
}

/// A blob store backed by a map from `(bucket, key)` to bytes.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: HashMap<(String, String), Vec<u8>>,
    calls: Mutex<Vec<(BucketName, ObjectKey)>>,
}

impl InMemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object.
    #[must_use]
    pub fn with_object(
        mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        self.objects
            .insert((bucket.into(), key.into()), contents.into());
        self
    }

    /// Returns the objects requested so far, in order.
    pub fn calls(&self) -> Vec<(BucketName, ObjectKey)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn download(&self, bucket: &BucketName, key: &ObjectKey) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((bucket.clone(), key.clone()));
        }
        self.objects
            .get(&(bucket.as_str().to_string(), key.as_str().to_string()))
            .cloned()
            .ok_or_else(|| {
                FetchError::new(
                    Service::BlobStore,
                    FetchErrorKind::NotFound,
                    format!("gs://{bucket}/{key}"),
                    "No such object",
                )
            })
    }
}

/// A notebook service that answers every lookup with an `ACTIVE` instance,
/// unless the instance was registered as missing.
#[derive(Debug, Default)]
pub struct RecordingNotebookService {
    missing: Vec<String>,
    calls: Mutex<Vec<NotebookInstancePath>>,
}

impl RecordingNotebookService {
    /// Creates a service that knows every instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes lookups of `path` fail with `NotFound`.
    #[must_use]
    pub fn with_missing(mut self, path: impl Into<String>) -> Self {
        self.missing.push(path.into());
        self
    }

    /// Returns the instances requested so far, in order.
    pub fn calls(&self) -> Vec<NotebookInstancePath> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotebookService for RecordingNotebookService {
    async fn get_instance(
        &self,
        path: &NotebookInstancePath,
    ) -> Result<NotebookInstance, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.clone());
        }
        let name = path.to_string();
        if self.missing.contains(&name) {
            return Err(FetchError::new(
                Service::NotebookService,
                FetchErrorKind::NotFound,
                name,
                "instance not found",
            ));
        }
        Ok(NotebookInstance {
            name,
            state: Some("ACTIVE".to_string()),
            proxy_uri: None,
            extra: serde_json::Map::new(),
        })
    }
}
