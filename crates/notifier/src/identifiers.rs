//! Newtype domain identifiers.
//!
//! Every value that names something in an external service is a distinct
//! newtype wrapping a `String`. A [`BucketName`] cannot be passed where a
//! [`RequestId`] is expected even though both arrive as plain strings in the
//! build substitutions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single invocation of the dispatcher (one inbound event).
///
/// Generated fresh for every event; recorded on the invocation span so all log
/// lines from a single event can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (build substitutions / cloud resource names)
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a RAD Lab deployment request (`_REQUEST_ID` substitution).
    ///
    /// Keys both the request document and the Terraform state object.
    RequestId
}

string_id! {
    /// A Cloud Storage bucket name (`_STORAGE_BUCKET` substitution).
    BucketName
}

string_id! {
    /// A Google Cloud project ID (e.g. `"radlab-ds-analytics-1a2b"`).
    ProjectId
}

string_id! {
    /// A zone or region in which a notebook instance lives (e.g. `"us-central1-a"`).
    LocationId
}

string_id! {
    /// The short name of a managed notebook instance.
    InstanceName
}

// ---------------------------------------------------------------------------
// Derived resource paths
// ---------------------------------------------------------------------------

/// Collection holding one document per deployment request.
pub const REQUESTS_COLLECTION: &str = "rad-lab-requests";

/// Object name of the Terraform state file inside a request's prefix.
pub const TFSTATE_OBJECT: &str = "default.tfstate";

/// Path of a document relative to the database root
/// (e.g. `"rad-lab-requests/req-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Returns the path of the request document for `request_id`.
    pub fn for_request(request_id: &RequestId) -> Self {
        Self(format!("{REQUESTS_COLLECTION}/{request_id}"))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of an object inside a bucket (e.g. `"req-1/default.tfstate"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Returns the key of the Terraform state written for `request_id`.
    pub fn tfstate_for(request_id: &RequestId) -> Self {
        Self(format!("{request_id}/{TFSTATE_OBJECT}"))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully-qualified resource name of a notebook instance:
/// `projects/{project}/locations/{location}/instances/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotebookInstancePath {
    project: ProjectId,
    location: LocationId,
    name: InstanceName,
}

impl NotebookInstancePath {
    /// Creates a path from its three components.
    pub fn new(project: ProjectId, location: LocationId, name: InstanceName) -> Self {
        Self {
            project,
            location,
            name,
        }
    }

    /// Returns the owning project.
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Returns the instance location.
    pub fn location(&self) -> &LocationId {
        &self.location
    }

    /// Returns the short instance name.
    pub fn name(&self) -> &InstanceName {
        &self.name
    }
}

impl std::fmt::Display for NotebookInstancePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/instances/{}",
            self.project, self.location, self.name
        )
    }
}
