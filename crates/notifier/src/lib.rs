//! Core domain for the RAD Lab build notifier.
//!
//! This crate contains every domain concept used by the relay: newtype
//! identifiers, the closed set of deployment flavors, inbound event decoding,
//! Terraform state access, error types, and the port traits through which the
//! relay reads external services. Infrastructure crates implement the traits
//! defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers and derived resource paths |
//! | [`types`] | `Flavor`, `BuildStatus`, fetched records |
//! | [`event`] | CloudEvent envelope and build payload decoding |
//! | [`state`] | Terraform provisioning state outputs |
//! | [`errors`] | Decode, fetch, state-shape and aggregate errors |
//! | [`ports`] | `DocumentStore`, `BlobStore`, `NotebookService` |

pub mod errors;
pub mod event;
pub mod identifiers;
pub mod ports;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{DecodeError, FetchError, FetchErrorKind, RelayError, Service, StateShapeError};
pub use event::{BuildData, BuildEvent, CloudEvent, MessagePublishedData, PubsubMessage};
pub use identifiers::{
    BucketName, DocumentPath, InstanceName, InvocationId, LocationId, NotebookInstancePath,
    ObjectKey, ProjectId, RequestId,
};
pub use ports::{BlobStore, DocumentStore, NotebookService};
pub use state::ProvisioningState;
pub use types::{BuildStatus, Flavor, NotebookInstance, RequestRecord, Timestamp};
