//! Request plumbing shared by the REST adapters.

use std::time::Duration;

use notifier::{FetchError, FetchErrorKind, Service};
use reqwest::{StatusCode, Url};

use crate::Credentials;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client shared by an adapter for its whole lifetime.
pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Appends `segments` to `endpoint`, percent-encoding each one.
///
/// A segment containing `/` stays a single segment (encoded as `%2F`).
pub(crate) fn resource_url<'a>(
    endpoint: &str,
    segments: impl IntoIterator<Item = &'a str>,
    service: Service,
    resource: &str,
) -> Result<Url, FetchError> {
    let invalid = |message: String| {
        FetchError::new(service, FetchErrorKind::Transport, resource, message)
    };
    let mut url =
        Url::parse(endpoint).map_err(|e| invalid(format!("invalid endpoint '{endpoint}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| invalid(format!("endpoint '{endpoint}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends an authorised `GET` and returns the response if its status is a success.
///
/// `Ok(None)` means the service answered `404 Not Found` and `not_found_is_empty`
/// was set; every other non-success status becomes a [`FetchError`].
pub(crate) async fn get(
    client: &reqwest::Client,
    credentials: &Credentials,
    url: Url,
    service: Service,
    resource: &str,
    not_found_is_empty: bool,
) -> Result<Option<reqwest::Response>, FetchError> {
    let request = credentials
        .authorize(client.get(url), service, resource)
        .await?;
    let response = request.send().await.map_err(|e| {
        FetchError::new(
            service,
            FetchErrorKind::Transport,
            resource,
            format!("request failed: {e}"),
        )
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(Some(response));
    }
    if status == StatusCode::NOT_FOUND && not_found_is_empty {
        return Ok(None);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = google_error_message(&body);
    tracing::debug!(%service, resource, %status, message = %message, "Request failed");
    Err(FetchError::new(
        service,
        kind_for_status(status),
        resource,
        format!("{status}: {message}"),
    ))
}

/// Maps an HTTP status to a [`FetchErrorKind`].
pub(crate) fn kind_for_status(status: StatusCode) -> FetchErrorKind {
    match status {
        StatusCode::NOT_FOUND => FetchErrorKind::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchErrorKind::PermissionDenied,
        StatusCode::TOO_MANY_REQUESTS => FetchErrorKind::Unavailable,
        s if s.is_server_error() => FetchErrorKind::Unavailable,
        s if s.is_client_error() => FetchErrorKind::Rejected,
        _ => FetchErrorKind::InvalidResponse,
    }
}

/// Extracts `error.message` from a Google API error body, falling back to
/// the raw text.
fn google_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).to_string())
}
