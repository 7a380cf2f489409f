//! Event dispatcher: decode, route, fetch state, hand off.
//!
//! One call to [`Dispatcher::dispatch`] handles exactly one event. Steps run
//! strictly in sequence:
//!
//! 1. Decode the build payload from the envelope.
//! 2. Resolve the trigger name to a [`Flavor`]; unknown triggers end here
//!    without touching any external service.
//! 3. Fetch the request document.
//! 4. Download and parse the Terraform state.
//! 5. Run the flavor's handler.

use std::sync::Arc;

use notifier::{
    BlobStore, CloudEvent, DocumentPath, DocumentStore, Flavor, InvocationId, ObjectKey,
    ProvisioningState, RelayError,
};
use tracing::Instrument;

use crate::flavors::{HandlerContext, HandlerSet};

/// What an invocation did with its event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The trigger is not one of the known flavors; nothing was fetched.
    Ignored {
        /// Trigger name carried by the build, if any.
        trigger_name: Option<String>,
    },
    /// The flavor's handler ran to completion.
    Handled {
        /// Flavor that was dispatched.
        flavor: Flavor,
    },
}

/// Routes build notifications to flavor handlers.
///
/// The store clients are injected so they can be shared across invocations
/// and replaced by doubles in tests.
#[derive(Clone)]
pub struct Dispatcher {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    handlers: HandlerSet,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("documents", &"<DocumentStore>")
            .field("blobs", &"<BlobStore>")
            .field("handlers", &self.handlers)
            .finish()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over the given clients and handlers.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        handlers: HandlerSet,
    ) -> Self {
        Self {
            documents,
            blobs,
            handlers,
        }
    }

    /// Handles one inbound event.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError`] if the payload cannot be decoded, a fetch
    /// fails, the flavor has no handler, or the handler fails. An unknown
    /// trigger is not an error.
    pub async fn dispatch(&self, event: &CloudEvent) -> Result<Outcome, RelayError> {
        let invocation_id = InvocationId::new_random();
        let span = tracing::info_span!(
            "invocation",
            %invocation_id,
            event_id = event.id.as_deref().unwrap_or_default(),
            message_id = event.data.message.message_id.as_deref().unwrap_or_default(),
            flavor = tracing::field::Empty,
        );
        self.run(event).instrument(span).await
    }

    async fn run(&self, event: &CloudEvent) -> Result<Outcome, RelayError> {
        let build = event.decode_build()?;

        let Some(flavor) = build.route() else {
            tracing::info!(
                trigger_name = build.trigger_name().unwrap_or_default(),
                "Not implemented for trigger name"
            );
            return Ok(Outcome::Ignored {
                trigger_name: build.trigger_name().map(str::to_string),
            });
        };
        tracing::Span::current().record("flavor", flavor.as_str());

        let build = build.into_event(flavor)?;
        tracing::info!(
            trigger_name = flavor.trigger_name(),
            build_status = %build.status,
            request_id = %build.request_id,
            bucket = %build.bucket,
            build_id = build.build_id.as_deref(),
            log_url = build.log_url.as_deref(),
            "Received build data"
        );

        let document_path = DocumentPath::for_request(&build.request_id);
        tracing::info!(path = %document_path, "Fetching request data");
        let request = self.documents.get_document(&document_path).await?;
        if !request.exists() {
            tracing::warn!(path = %document_path, "Request document does not exist");
        }

        let key = ObjectKey::tfstate_for(&build.request_id);
        tracing::info!(bucket = %build.bucket, object = %key, "Fetching terraform state");
        let bytes = self.blobs.download(&build.bucket, &key).await?;
        let state = ProvisioningState::from_bytes(bytes)?;

        let handler = self
            .handlers
            .get(flavor)
            .ok_or(RelayError::NoHandler { flavor })?;
        let ctx = HandlerContext {
            request_id: &build.request_id,
            build_status: &build.status,
            request: &request,
            state: &state,
        };
        handler.handle(&ctx).await?;

        tracing::debug!("Handler completed");
        Ok(Outcome::Handled { flavor })
    }
}
