//! Data-science follow-up: report the notebook instances a successful
//! deployment created.

use std::sync::Arc;

use async_trait::async_trait;
use notifier::{NotebookService, RelayError};

use super::{FlavorHandler, HandlerContext};

/// Looks up every notebook instance listed in the Terraform outputs once the
/// build has succeeded.
///
/// Non-success builds are logged and otherwise ignored; no remediation is
/// defined for them.
pub struct DataScienceHandler {
    notebooks: Arc<dyn NotebookService>,
}

impl std::fmt::Debug for DataScienceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataScienceHandler")
            .field("notebooks", &"<NotebookService>")
            .finish()
    }
}

impl DataScienceHandler {
    /// Creates a handler that queries `notebooks`.
    pub fn new(notebooks: Arc<dyn NotebookService>) -> Self {
        Self { notebooks }
    }

    async fn report_instances(&self, ctx: &HandlerContext<'_>) -> Result<(), RelayError> {
        let instances = ctx.state.notebook_instances()?;
        tracing::debug!(count = instances.len(), "Looking up notebook instances");

        // Sequential on purpose: one lookup in flight at a time.
        for path in &instances {
            let instance = self.notebooks.get_instance(path).await?;
            tracing::info!(
                instance = %path,
                location = %path.location(),
                state = instance.state.as_deref().unwrap_or("STATE_UNSPECIFIED"),
                proxy_uri = instance.proxy_uri.as_deref(),
                notebook_instance = ?instance,
                "Notebook instance status"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl FlavorHandler for DataScienceHandler {
    async fn handle(&self, ctx: &HandlerContext<'_>) -> Result<(), RelayError> {
        if ctx.build_status.is_success() {
            self.report_instances(ctx).await
        } else {
            tracing::info!(
                build_status = %ctx.build_status,
                "Not implemented for build status"
            );
            Ok(())
        }
    }
}
