//! Bearer-token credentials for the Google Cloud REST APIs.

use std::sync::Arc;

use gcp_auth::TokenProvider;
use notifier::{FetchError, FetchErrorKind, Service};

/// OAuth scope granting access to all three APIs the relay reads.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// How adapters authenticate their requests.
#[derive(Clone)]
pub enum Credentials {
    /// Attach a bearer token from application default credentials
    /// (service account key, workload identity, or the metadata server).
    Provider(Arc<dyn TokenProvider>),
    /// Send requests without an `Authorization` header (emulators, tests).
    Anonymous,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(_) => f.write_str("Credentials::Provider(<TokenProvider>)"),
            Self::Anonymous => f.write_str("Credentials::Anonymous"),
        }
    }
}

impl Credentials {
    /// Discovers application default credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential source is available.
    pub async fn discover() -> Result<Self, gcp_auth::Error> {
        let provider = gcp_auth::provider().await?;
        Ok(Self::Provider(provider))
    }

    /// Returns the project the credentials belong to, if known.
    pub async fn project_id(&self) -> Option<String> {
        match self {
            Self::Provider(provider) => match provider.project_id().await {
                Ok(project) => Some(project.to_string()),
                Err(e) => {
                    tracing::debug!(error = %e, "Credentials do not name a project");
                    None
                }
            },
            Self::Anonymous => None,
        }
    }

    /// Adds an `Authorization` header to `request` when credentials are present.
    pub(crate) async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        service: Service,
        resource: &str,
    ) -> Result<reqwest::RequestBuilder, FetchError> {
        match self {
            Self::Provider(provider) => {
                let token = provider.token(&[CLOUD_PLATFORM_SCOPE]).await.map_err(|e| {
                    FetchError::new(
                        service,
                        FetchErrorKind::Transport,
                        resource,
                        format!("failed to get access token: {e}"),
                    )
                })?;
                Ok(request.bearer_auth(token.as_str()))
            }
            Self::Anonymous => Ok(request),
        }
    }
}
