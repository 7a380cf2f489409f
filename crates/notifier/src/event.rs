//! Inbound event envelope and build payload decoding.
//!
//! A build notification arrives as a CloudEvent wrapping a Pub/Sub message.
//! The message `data` is a base64-encoded JSON document shaped like a Cloud
//! Build resource:
//!
//! ```text
//! CloudEvent.data.message.data = base64({"status": "...", "substitutions": {...}, ...})
//! ```
//!
//! Decoding happens in two steps so routing can short-circuit early:
//!
//! 1. [`CloudEvent::decode_build`] turns the envelope into [`BuildData`].
//! 2. [`BuildData::route`] resolves the trigger name; only a known
//!    [`Flavor`] proceeds to [`BuildData::into_event`], which extracts the
//!    fields the dispatcher needs.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::{BucketName, BuildStatus, DecodeError, Flavor, RequestId, Timestamp};

/// Substitution carrying the name of the trigger that started the build.
pub const TRIGGER_NAME_KEY: &str = "TRIGGER_NAME";
/// Substitution carrying the RAD Lab request ID.
pub const REQUEST_ID_KEY: &str = "_REQUEST_ID";
/// Substitution carrying the Terraform state bucket.
pub const STORAGE_BUCKET_KEY: &str = "_STORAGE_BUCKET";

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A CloudEvent carrying a Pub/Sub message.
///
/// In structured content mode the whole document deserialises into this type.
/// In binary content mode the attributes arrive as `ce-*` headers and only
/// `data` is in the body; the listener assembles the envelope itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    /// Event ID assigned by the producer.
    #[serde(default)]
    pub id: Option<String>,

    /// Event source (e.g. `//pubsub.googleapis.com/projects/p/topics/cloud-builds`).
    #[serde(default)]
    pub source: Option<String>,

    /// Event type (e.g. `google.cloud.pubsub.topic.v1.messagePublished`).
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,

    /// Time the event was produced.
    #[serde(default)]
    pub time: Option<Timestamp>,

    /// Event payload.
    pub data: MessagePublishedData,
}

impl CloudEvent {
    /// Wraps Pub/Sub message data in an envelope with no CloudEvent attributes.
    pub fn from_data(data: MessagePublishedData) -> Self {
        Self {
            id: None,
            source: None,
            event_type: None,
            time: None,
            data,
        }
    }

    /// Decodes the embedded build payload.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the message has no data, the data is not
    /// base64, or the decoded bytes are not a JSON build resource.
    pub fn decode_build(&self) -> Result<BuildData, DecodeError> {
        let encoded = self
            .data
            .message
            .data
            .as_deref()
            .ok_or(DecodeError::MissingField {
                field: "message.data",
            })?;
        let value = decode_message_data(encoded)?;
        serde_json::from_value(value).map_err(DecodeError::Payload)
    }
}

/// Payload of a `messagePublished` CloudEvent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePublishedData {
    /// The published message.
    pub message: PubsubMessage,

    /// Subscription that delivered the message.
    #[serde(default)]
    pub subscription: Option<String>,
}

/// A Pub/Sub message as delivered in a push request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    /// Base64-encoded message body.
    #[serde(default)]
    pub data: Option<String>,

    /// Message attributes (Cloud Build sets `buildId` and `status`).
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Server-assigned message ID.
    #[serde(default)]
    pub message_id: Option<String>,
}

impl PubsubMessage {
    /// Creates a message whose body is `payload` serialised as JSON and
    /// base64-encoded, the way Cloud Build publishes build resources.
    pub fn from_json(payload: &serde_json::Value) -> Self {
        Self {
            data: Some(encode_message_data(payload)),
            attributes: HashMap::new(),
            message_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload decoding
// ---------------------------------------------------------------------------

/// Decodes base64 message data into a JSON document.
///
/// # Errors
///
/// Returns [`DecodeError::Base64`] or [`DecodeError::Json`].
pub fn decode_message_data(encoded: &str) -> Result<serde_json::Value, DecodeError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    serde_json::from_slice(&bytes).map_err(DecodeError::Json)
}

/// Serialises `payload` as JSON and base64-encodes it.
pub fn encode_message_data(payload: &serde_json::Value) -> String {
    STANDARD.encode(payload.to_string())
}

/// The subset of a Cloud Build resource the relay reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildData {
    /// Build ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Build status (e.g. `"SUCCESS"`).
    #[serde(default)]
    pub status: Option<String>,

    /// Build substitutions, including `TRIGGER_NAME`.
    pub substitutions: HashMap<String, String>,

    /// Console URL of the build log.
    #[serde(default)]
    pub log_url: Option<String>,
}

impl BuildData {
    /// Returns the raw trigger name, if the build carries one.
    pub fn trigger_name(&self) -> Option<&str> {
        self.substitutions.get(TRIGGER_NAME_KEY).map(String::as_str)
    }

    /// Resolves the trigger name against the known flavors.
    ///
    /// `None` means the build came from an unrelated trigger.
    pub fn route(&self) -> Option<Flavor> {
        self.trigger_name().and_then(Flavor::from_trigger_name)
    }

    /// Extracts the fields needed to fetch state and dispatch `flavor`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingField`] if the request ID or bucket is
    /// absent or empty. A build without a status is treated as not successful.
    pub fn into_event(mut self, flavor: Flavor) -> Result<BuildEvent, DecodeError> {
        let status = self
            .status
            .take()
            .map(BuildStatus::new)
            .unwrap_or_else(|| BuildStatus::new(""));
        let request_id = self
            .substitutions
            .remove(REQUEST_ID_KEY)
            .and_then(RequestId::new)
            .ok_or(DecodeError::MissingField {
                field: REQUEST_ID_KEY,
            })?;
        let bucket = self
            .substitutions
            .remove(STORAGE_BUCKET_KEY)
            .and_then(BucketName::new)
            .ok_or(DecodeError::MissingField {
                field: STORAGE_BUCKET_KEY,
            })?;

        Ok(BuildEvent {
            flavor,
            status,
            request_id,
            bucket,
            build_id: self.id,
            log_url: self.log_url,
        })
    }
}

/// A routed build notification with everything the dispatcher needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEvent {
    /// Flavor resolved from the trigger name.
    pub flavor: Flavor,
    /// Build status.
    pub status: BuildStatus,
    /// RAD Lab request ID.
    pub request_id: RequestId,
    /// Bucket holding the Terraform state.
    pub bucket: BucketName,
    /// Build ID, for log correlation.
    pub build_id: Option<String>,
    /// Build log URL, for log correlation.
    pub log_url: Option<String>,
}
