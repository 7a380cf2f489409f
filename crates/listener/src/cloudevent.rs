//! CloudEvent HTTP bindings.
//!
//! Two content modes are accepted:
//!
//! - **Binary**: attributes in `ce-*` headers, body is the event `data`
//!   (a Pub/Sub `MessagePublishedData`). A plain Pub/Sub push request has the
//!   same body and no `ce-*` headers, so it is handled here too.
//! - **Structured**: `Content-Type: application/cloudevents+json`, body is the
//!   whole event including `data`.

use axum::http::{header, HeaderMap};
use notifier::{CloudEvent, MessagePublishedData, Timestamp};

const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

/// Builds a [`CloudEvent`] from an HTTP request.
///
/// # Errors
///
/// Returns the JSON error if the body does not match the content mode.
pub fn from_request(headers: &HeaderMap, body: &[u8]) -> Result<CloudEvent, serde_json::Error> {
    if is_structured(headers) {
        return serde_json::from_slice(body);
    }

    let data: MessagePublishedData = serde_json::from_slice(body)?;
    let mut event = CloudEvent::from_data(data);
    event.id = header_str(headers, "ce-id");
    event.source = header_str(headers, "ce-source");
    event.event_type = header_str(headers, "ce-type");
    event.time = header_str(headers, "ce-time")
        .as_deref()
        .and_then(Timestamp::parse_rfc3339);
    Ok(event)
}

fn is_structured(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with(STRUCTURED_CONTENT_TYPE))
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
