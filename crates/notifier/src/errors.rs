//! Error types for the notifier domain.
//!
//! Every fallible boundary has its own error type so callers (and tests) can
//! tell a malformed event apart from a failed fetch or a provisioning state
//! with an unexpected shape:
//!
//! | Boundary | Error |
//! |----------|-------|
//! | Event payload decoding | [`DecodeError`] |
//! | Document store, blob store, instance API | [`FetchError`] |
//! | Reading Terraform outputs | [`StateShapeError`] |
//!
//! [`RelayError`] aggregates them for the dispatcher and handlers.
//!
//! Two conditions are deliberately *not* errors: an unknown trigger name, and
//! a non-success build status in the data-science flavor.

use thiserror::Error;

use crate::Flavor;

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// The inbound event, or the provisioning state blob, could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The message data is not valid base64.
    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The decoded text is not a JSON document.
    #[error("payload is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// The JSON document does not have the shape of a build resource.
    #[error("payload is not a build resource: {0}")]
    Payload(#[source] serde_json::Error),

    /// A field required after routing is absent or empty.
    #[error("build payload is missing '{field}'")]
    MissingField {
        /// Name of the absent field (e.g. `"_REQUEST_ID"`).
        field: &'static str,
    },
}

// ---------------------------------------------------------------------------
// External fetches
// ---------------------------------------------------------------------------

/// External service a [`FetchError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Request document lookup.
    DocumentStore,
    /// Terraform state download.
    BlobStore,
    /// Notebook instance status lookup.
    NotebookService,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DocumentStore => "document store",
            Self::BlobStore => "blob store",
            Self::NotebookService => "notebook service",
        };
        f.write_str(label)
    }
}

/// Classification of a failed external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The resource does not exist.
    NotFound,
    /// Credentials are missing or lack permission for the resource.
    PermissionDenied,
    /// The service rejected the request itself (any other 4xx status).
    Rejected,
    /// The service answered with a server-side or throttling error.
    Unavailable,
    /// The service answered, but the response body could not be interpreted.
    InvalidResponse,
    /// The request never produced a response (DNS, TLS, timeout, token fetch).
    Transport,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::Rejected => "rejected",
            Self::Unavailable => "unavailable",
            Self::InvalidResponse => "invalid response",
            Self::Transport => "transport",
        };
        f.write_str(label)
    }
}

/// A call to one of the three external services failed.
#[derive(Debug, Error)]
#[error("{service} request for '{resource}' failed ({kind}): {message}")]
pub struct FetchError {
    /// Service that was called.
    pub service: Service,
    /// What went wrong.
    pub kind: FetchErrorKind,
    /// Resource that was requested (document path, object key, instance name).
    pub resource: String,
    /// Human-readable detail from the transport or the service.
    pub message: String,
}

impl FetchError {
    /// Creates a new fetch error.
    pub fn new(
        service: Service,
        kind: FetchErrorKind,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            service,
            kind,
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind == FetchErrorKind::NotFound
    }
}

// ---------------------------------------------------------------------------
// Provisioning state shape
// ---------------------------------------------------------------------------

/// The Terraform state does not contain the outputs a handler needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateShapeError {
    /// The state has no `outputs` object.
    #[error("provisioning state has no 'outputs' object")]
    MissingOutputs,

    /// A named output (or its `value`) is absent.
    #[error("provisioning state has no output '{name}'")]
    MissingOutput {
        /// Output name.
        name: String,
    },

    /// A named output's `value` is not a string.
    #[error("output '{name}' is not a string")]
    NotAString {
        /// Output name.
        name: String,
    },

    /// A named output's `value` is an empty string where an identifier is required.
    #[error("output '{name}' is empty")]
    EmptyValue {
        /// Output name.
        name: String,
    },

    /// The instance names and instance locations outputs list a different
    /// number of entries, so they cannot be paired.
    #[error("{names} notebook instance names but {locations} locations")]
    InstanceCountMismatch {
        /// Number of entries in `notebooks-instance-names`.
        names: usize,
        /// Number of entries in `notebooks-instance-locations`.
        locations: usize,
    },
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Any failure that ends an invocation.
///
/// Nothing here is retried locally; the error surfaces to the event delivery
/// layer, whose redelivery policy applies.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The event payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An external fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The provisioning state lacks an expected output.
    #[error(transparent)]
    StateShape(#[from] StateShapeError),

    /// A known flavor has no handler registered with the dispatcher.
    ///
    /// Indicates a wiring mistake in the composition root, not bad input.
    #[error("no handler registered for flavor {flavor}")]
    NoHandler {
        /// Flavor that could not be routed.
        flavor: Flavor,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_message_names_service_and_resource() {
        let err = FetchError::new(
            Service::BlobStore,
            FetchErrorKind::NotFound,
            "req-1/default.tfstate",
            "No such object",
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "blob store request for 'req-1/default.tfstate' failed (not found): No such object"
        );
    }

    #[test]
    fn relay_error_is_transparent_over_its_sources() {
        let err: RelayError = StateShapeError::InstanceCountMismatch {
            names: 2,
            locations: 1,
        }
        .into();
        assert_eq!(err.to_string(), "2 notebook instance names but 1 locations");
    }
}
