//! RAD Lab notifier Google Cloud adapters.
//!
//! Implements the port traits defined in the [`notifier`] crate over the
//! Google Cloud REST APIs:
//!
//! | Port | Adapter | API |
//! |------|---------|-----|
//! | [`notifier::DocumentStore`] | [`FirestoreClient`] | Firestore v1 documents |
//! | [`notifier::BlobStore`] | [`CloudStorageClient`] | Cloud Storage JSON API |
//! | [`notifier::NotebookService`] | [`NotebooksClient`] | Notebooks v1 instances |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, authentication, URL encoding and
//! status-code classification live here. The [`notifier`] crate sees only its
//! own traits and [`notifier::FetchError`].
//!
//! Each client owns one `reqwest::Client` and is meant to be built once per
//! process and shared across invocations.

pub mod auth;
pub mod firestore;
mod http;
pub mod notebooks;
pub mod storage;

pub use auth::{Credentials, CLOUD_PLATFORM_SCOPE};
pub use firestore::{FirestoreClient, DEFAULT_FIRESTORE_ENDPOINT};
pub use notebooks::{NotebooksClient, DEFAULT_NOTEBOOKS_ENDPOINT};
pub use storage::{CloudStorageClient, DEFAULT_STORAGE_ENDPOINT};

#[cfg(test)]
mod testing {
    /// Serves `app` on an ephemeral loopback port and returns its base URL.
    pub(crate) async fn spawn_server(app: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }
}
