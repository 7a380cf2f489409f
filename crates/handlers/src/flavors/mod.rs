//! Per-flavor follow-up handlers.
//!
//! Every flavor gets exactly one [`FlavorHandler`]. Only data-science does
//! real work today; the other four log their inputs and act as extension
//! points.

mod data_science;
mod logging;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use notifier::{
    BuildStatus, Flavor, NotebookService, ProvisioningState, RelayError, RequestId,
    RequestRecord,
};

pub use data_science::DataScienceHandler;
pub use logging::LoggingHandler;

/// Everything a handler receives for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// Deployment request the build belongs to.
    pub request_id: &'a RequestId,
    /// Status of the build that produced the event.
    pub build_status: &'a BuildStatus,
    /// Request document, passed through unparsed.
    pub request: &'a RequestRecord,
    /// Terraform state written by the build.
    pub state: &'a ProvisioningState,
}

/// Follow-up action for one deployment flavor.
#[async_trait]
pub trait FlavorHandler: Send + Sync {
    /// Runs the follow-up action.
    ///
    /// # Errors
    ///
    /// Any error ends the invocation and is propagated unchanged.
    async fn handle(&self, ctx: &HandlerContext<'_>) -> Result<(), RelayError>;
}

/// Routing table from flavor to handler.
#[derive(Clone, Default)]
pub struct HandlerSet {
    handlers: BTreeMap<Flavor, Arc<dyn FlavorHandler>>,
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("flavors", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the production handler for every flavor.
    pub fn standard(notebooks: Arc<dyn NotebookService>) -> Self {
        let mut set = Self::new();
        for flavor in Flavor::ALL {
            let handler: Arc<dyn FlavorHandler> = match flavor {
                Flavor::DataScience => Arc::new(DataScienceHandler::new(Arc::clone(&notebooks))),
                Flavor::AlphaFold
                | Flavor::GenomicsCromwell
                | Flavor::GenomicsDsub
                | Flavor::SiliconDesign => Arc::new(LoggingHandler::new(flavor)),
            };
            set = set.with_handler(flavor, handler);
        }
        set
    }

    /// Registers `handler` for `flavor`, replacing any previous handler.
    #[must_use]
    pub fn with_handler(mut self, flavor: Flavor, handler: Arc<dyn FlavorHandler>) -> Self {
        self.handlers.insert(flavor, handler);
        self
    }

    /// Returns the handler registered for `flavor`.
    pub fn get(&self, flavor: Flavor) -> Option<&Arc<dyn FlavorHandler>> {
        self.handlers.get(&flavor)
    }
}
