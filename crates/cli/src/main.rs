//! RAD Lab notifier entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Read configuration**: [`config::Config::from_env`].
//! 2. **Wire observability**: configure `tracing-subscriber` with a JSON or
//!    pretty layer and, optionally, an OpenTelemetry OTLP exporter. All
//!    `tracing` spans and events emitted by every crate flow through it.
//! 3. **Construct infrastructure**: create the Firestore, Cloud Storage and
//!    Notebooks clients once and inject them into the [`handlers::Dispatcher`].
//! 4. **Serve**: run the CloudEvent receiver until SIGTERM or Ctrl-C.

mod config;
mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use gcp::{CloudStorageClient, Credentials, FirestoreClient, NotebooksClient};
use handlers::{Dispatcher, HandlerSet};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let telemetry = telemetry::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "Notifier stopped");
    }

    telemetry.shutdown();
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    let credentials = match Credentials::discover().await {
        Ok(credentials) => credentials,
        Err(e) if config.fully_emulated() => {
            tracing::warn!(error = %e, "No credentials found; every service is emulated");
            Credentials::Anonymous
        }
        Err(e) => return Err(e).context("no Google Cloud credentials available"),
    };

    let project_id = match config.project_id.clone() {
        Some(project) => project,
        None => credentials
            .project_id()
            .await
            .context("set GOOGLE_CLOUD_PROJECT; the credentials do not name a project")?,
    };

    let dispatcher = build_dispatcher(&config, &credentials, project_id);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    listener::serve(addr, Arc::new(dispatcher), shutdown_signal()).await?;

    tracing::info!("Notifier stopped");
    Ok(())
}

fn build_dispatcher(config: &Config, credentials: &Credentials, project_id: String) -> Dispatcher {
    let credentials_for = |emulator: bool| {
        if emulator {
            Credentials::Anonymous
        } else {
            credentials.clone()
        }
    };

    let firestore = match &config.firestore {
        Some(endpoint) => {
            FirestoreClient::new(project_id.clone(), credentials_for(endpoint.emulator))
                .with_endpoint(endpoint.url.clone())
        }
        None => FirestoreClient::new(project_id.clone(), credentials.clone()),
    };

    let storage = match &config.storage {
        Some(endpoint) => CloudStorageClient::new(credentials_for(endpoint.emulator))
            .with_endpoint(endpoint.url.clone()),
        None => CloudStorageClient::new(credentials.clone()),
    };

    let mut notebooks = NotebooksClient::new(credentials.clone());
    if let Some(endpoint) = &config.notebooks_endpoint {
        notebooks = notebooks.with_endpoint(endpoint.clone());
    }

    tracing::info!(
        project_id = %project_id,
        firestore_emulated = config.firestore.is_some(),
        storage_emulated = config.storage.is_some(),
        "Clients configured"
    );

    Dispatcher::new(
        Arc::new(firestore),
        Arc::new(storage),
        HandlerSet::standard(Arc::new(notebooks)),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
