//! Notebook instance lookups over the Notebooks v1 REST API.

use async_trait::async_trait;
use notifier::{
    FetchError, FetchErrorKind, NotebookInstance, NotebookInstancePath, NotebookService, Service,
};

use crate::http;
use crate::Credentials;

/// Production Notebooks API endpoint.
pub const DEFAULT_NOTEBOOKS_ENDPOINT: &str = "https://notebooks.googleapis.com";

/// Reads managed notebook instance status.
#[derive(Debug, Clone)]
pub struct NotebooksClient {
    client: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
}

impl NotebooksClient {
    /// Creates a client for the production endpoint.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: http::build_client(),
            credentials,
            endpoint: DEFAULT_NOTEBOOKS_ENDPOINT.to_string(),
        }
    }

    /// Overrides the API endpoint (e.g. a regional endpoint).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl NotebookService for NotebooksClient {
    async fn get_instance(
        &self,
        path: &NotebookInstancePath,
    ) -> Result<NotebookInstance, FetchError> {
        let resource = path.to_string();
        let url = http::resource_url(
            &self.endpoint,
            [
                "v1",
                "projects",
                path.project().as_str(),
                "locations",
                path.location().as_str(),
                "instances",
                path.name().as_str(),
            ],
            Service::NotebookService,
            &resource,
        )?;

        let response = http::get(
            &self.client,
            &self.credentials,
            url,
            Service::NotebookService,
            &resource,
            false,
        )
        .await?
        .ok_or_else(|| {
            FetchError::new(
                Service::NotebookService,
                FetchErrorKind::NotFound,
                resource.as_str(),
                "instance not found",
            )
        })?;

        response.json::<NotebookInstance>().await.map_err(|e| {
            FetchError::new(
                Service::NotebookService,
                FetchErrorKind::InvalidResponse,
                resource.as_str(),
                format!("invalid instance: {e}"),
            )
        })
    }
}
