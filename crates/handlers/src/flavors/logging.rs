//! Handler for flavors with no follow-up action yet.

use async_trait::async_trait;
use notifier::{Flavor, RelayError};

use super::{FlavorHandler, HandlerContext};

/// Logs the build status, request record and provisioning state, then returns.
///
/// Used for alpha-fold, genomics (Cromwell and dsub) and silicon design.
#[derive(Debug, Clone, Copy)]
pub struct LoggingHandler {
    flavor: Flavor,
}

impl LoggingHandler {
    /// Creates a handler that logs on behalf of `flavor`.
    pub fn new(flavor: Flavor) -> Self {
        Self { flavor }
    }
}

#[async_trait]
impl FlavorHandler for LoggingHandler {
    async fn handle(&self, ctx: &HandlerContext<'_>) -> Result<(), RelayError> {
        tracing::info!(
            flavor = %self.flavor,
            build_status = %ctx.build_status,
            request_id = %ctx.request_id,
            request_exists = ctx.request.exists(),
            request = ?ctx.request.fields,
            provisioning_state = %ctx.state.as_value(),
            "No follow-up action for flavor"
        );
        Ok(())
    }
}
