//! Port traits for the three external services the relay reads from.
//!
//! The dispatcher and handlers depend only on these traits. Infrastructure
//! crates implement them; tests substitute in-memory doubles.
//!
//! All three are read-only: nothing in the relay writes back to any service.

use async_trait::async_trait;

use crate::{
    BucketName, DocumentPath, FetchError, NotebookInstance, NotebookInstancePath, ObjectKey,
    RequestRecord,
};

/// Reads deployment request documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the document at `path`.
    ///
    /// A document that does not exist is not an error: implementations
    /// return [`RequestRecord::missing`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the store cannot be reached or refuses the
    /// request.
    async fn get_document(&self, path: &DocumentPath) -> Result<RequestRecord, FetchError>;
}

/// Downloads objects from a bucket.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Downloads the full contents of `key` in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] with kind `NotFound` if the object does not
    /// exist, or another kind if the download fails.
    async fn download(&self, bucket: &BucketName, key: &ObjectKey) -> Result<Vec<u8>, FetchError>;
}

/// Looks up managed notebook instances.
#[async_trait]
pub trait NotebookService: Send + Sync {
    /// Fetches the current description of the instance at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the instance does not exist or the API call
    /// fails.
    async fn get_instance(
        &self,
        path: &NotebookInstancePath,
    ) -> Result<NotebookInstance, FetchError>;
}
