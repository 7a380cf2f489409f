//! Runtime configuration, read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PORT` | `8080` | Port the event receiver listens on |
//! | `NOTIFIER_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `GOOGLE_CLOUD_PROJECT` / `GCP_PROJECT` | credentials' project | Firestore project |
//! | `FIRESTORE_EMULATOR_HOST` | unset | Use a Firestore emulator, unauthenticated |
//! | `STORAGE_EMULATOR_HOST` | unset | Use a Cloud Storage emulator, unauthenticated |
//! | `NOTEBOOKS_API_ENDPOINT` | production | Notebooks API endpoint override |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | Export spans over OTLP when set |

use thiserror::Error;

use crate::telemetry::LogFormat;

const DEFAULT_PORT: u16 = 8080;

/// A configuration value could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set to a value of the wrong form.
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
}

/// Where an adapter sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Base URL including scheme.
    pub url: String,
    /// `true` for local emulators, which take no credentials.
    pub emulator: bool,
}

impl ServiceEndpoint {
    fn emulator(host: &str) -> Self {
        let url = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        Self {
            url,
            emulator: true,
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Listening port.
    pub port: u16,
    /// Log output format.
    pub log_format: LogFormat,
    /// Project holding the request documents; discovered from credentials if unset.
    pub project_id: Option<String>,
    /// Firestore endpoint override.
    pub firestore: Option<ServiceEndpoint>,
    /// Cloud Storage endpoint override.
    pub storage: Option<ServiceEndpoint>,
    /// Notebooks API endpoint override.
    pub notebooks_endpoint: Option<String>,
    /// OTLP collector endpoint.
    pub otlp_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_format: LogFormat::Json,
            project_id: None,
            firestore: None,
            storage: None,
            notebooks_endpoint: None,
            otlp_endpoint: None,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable holds an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable holds an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = get("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: port.clone(),
                reason: "expected a port number",
            })?;
        }
        if let Some(format) = get("NOTIFIER_LOG_FORMAT") {
            config.log_format = format.parse().map_err(|()| ConfigError::Invalid {
                name: "NOTIFIER_LOG_FORMAT",
                value: format.clone(),
                reason: "expected 'json' or 'pretty'",
            })?;
        }

        config.project_id = get("GOOGLE_CLOUD_PROJECT").or_else(|| get("GCP_PROJECT"));
        config.firestore = get("FIRESTORE_EMULATOR_HOST").map(|h| ServiceEndpoint::emulator(&h));
        config.storage = get("STORAGE_EMULATOR_HOST").map(|h| ServiceEndpoint::emulator(&h));
        config.notebooks_endpoint = get("NOTEBOOKS_API_ENDPOINT");
        config.otlp_endpoint = get("OTEL_EXPORTER_OTLP_ENDPOINT");

        Ok(config)
    }

    /// Returns `true` if every service is served locally, so no credentials
    /// are needed.
    pub fn fully_emulated(&self) -> bool {
        let emulated = |endpoint: &Option<ServiceEndpoint>| {
            endpoint.as_ref().is_some_and(|e| e.emulator)
        };
        emulated(&self.firestore) && emulated(&self.storage) && self.notebooks_endpoint.is_some()
    }
}
