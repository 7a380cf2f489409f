//! Shared value types for the notifier domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! routing and status meaning: the closed set of deployment flavors, the build
//! status, and the records fetched from external services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DocumentPath;

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// The deployment flavors this relay knows how to follow up on.
///
/// Each flavor corresponds to exactly one build trigger. Converting a raw
/// trigger name with [`Flavor::from_trigger_name`] is the only allow-list
/// check in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// AlphaFold protein structure prediction.
    AlphaFold,
    /// Data science notebooks.
    DataScience,
    /// Genomics via the Cromwell workflow engine.
    GenomicsCromwell,
    /// Genomics via the dsub batch tool.
    GenomicsDsub,
    /// Open-source silicon design.
    SiliconDesign,
}

impl Flavor {
    /// Every flavor, in declaration order.
    pub const ALL: [Flavor; 5] = [
        Flavor::AlphaFold,
        Flavor::DataScience,
        Flavor::GenomicsCromwell,
        Flavor::GenomicsDsub,
        Flavor::SiliconDesign,
    ];

    /// Resolves a build trigger name to its flavor.
    ///
    /// Matching is exact and case-sensitive. Returns `None` for builds that
    /// were not produced by a RAD Lab launch trigger.
    pub fn from_trigger_name(trigger_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|flavor| flavor.trigger_name() == trigger_name)
    }

    /// Returns the build trigger name that produces events for this flavor.
    pub fn trigger_name(self) -> &'static str {
        match self {
            Self::AlphaFold => "rad-lab-launch-alpha-fold-pub-sub",
            Self::DataScience => "rad-lab-launch-data-science-pub-sub",
            Self::GenomicsCromwell => "rad-lab-launch-genomics-cromwell",
            Self::GenomicsDsub => "rad-lab-launch-genomics-dsub",
            Self::SiliconDesign => "rad-lab-launch-silicon-design",
        }
    }

    /// Returns a short label for logs (e.g. `"data_science"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlphaFold => "alpha_fold",
            Self::DataScience => "data_science",
            Self::GenomicsCromwell => "genomics_cromwell",
            Self::GenomicsDsub => "genomics_dsub",
            Self::SiliconDesign => "silicon_design",
        }
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Build status
// ---------------------------------------------------------------------------

/// Status of the build that produced the event (e.g. `"SUCCESS"`, `"FAILURE"`).
///
/// Only [`BuildStatus::SUCCESS`] is interpreted; every other value is treated
/// uniformly as "not success".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildStatus(String);

impl BuildStatus {
    /// The success sentinel.
    pub const SUCCESS: &'static str = "SUCCESS";

    /// Wraps a raw status string.
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    /// Returns `true` if the build succeeded.
    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }

    /// Returns the status as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parses an RFC 3339 timestamp (e.g. `"2024-05-01T12:00:00.123Z"`).
    ///
    /// Returns `None` if the value is not valid RFC 3339.
    pub fn parse_rfc3339(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Fetched records
// ---------------------------------------------------------------------------

/// The request document for a deployment, as returned by the document store.
///
/// Its fields are opaque to the relay and handed to handlers unparsed. A
/// document that does not exist is represented by a record with no fields,
/// mirroring a document-store snapshot whose `exists` flag is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Path the record was read from.
    pub path: DocumentPath,

    /// Raw document fields, or `None` when the document does not exist.
    pub fields: Option<serde_json::Value>,

    /// Last modification time reported by the store.
    pub update_time: Option<Timestamp>,
}

impl RequestRecord {
    /// Creates a record for a document that exists.
    pub fn found(path: DocumentPath, fields: serde_json::Value) -> Self {
        Self {
            path,
            fields: Some(fields),
            update_time: None,
        }
    }

    /// Creates the empty representation of a document that does not exist.
    pub fn missing(path: DocumentPath) -> Self {
        Self {
            path,
            fields: None,
            update_time: None,
        }
    }

    /// Sets the last modification time.
    #[must_use]
    pub fn with_update_time(mut self, update_time: Timestamp) -> Self {
        self.update_time = Some(update_time);
        self
    }

    /// Returns `true` if the document exists.
    pub fn exists(&self) -> bool {
        self.fields.is_some()
    }
}

/// A managed notebook instance as reported by the instance API.
///
/// Only the fields logged by the relay are typed; the rest of the resource is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookInstance {
    /// Fully-qualified resource name.
    #[serde(default)]
    pub name: String,

    /// Lifecycle state (e.g. `"ACTIVE"`, `"PROVISIONING"`).
    #[serde(default)]
    pub state: Option<String>,

    /// URL of the JupyterLab proxy, once the instance is serving.
    #[serde(default)]
    pub proxy_uri: Option<String>,

    /// All remaining resource fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
