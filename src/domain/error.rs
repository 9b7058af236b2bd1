use crate::app::config::ConfigError;
use crate::sender::request::BuildError;
use crate::sender::tls::TlsError;
use crate::storage::StorageError;
use thiserror::Error;

/// Terminal failure of one invocation.
///
/// The first error raised for any record aborts the rest of the batch and is
/// returned as-is; diagnostic context travels inside the variant.
#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("TLS client setup failed: {0}")]
    TlsBuild(#[from] TlsError),

    #[error("Failed to fetch object: {0}")]
    Fetch(#[from] StorageError),

    #[error("Failed to build request: {0}")]
    Build(BuildError),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http response was not successful. Status code: {status}, Response Body: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invocation cancelled")]
    Cancelled,
}

impl From<BuildError> for ForwarderError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Config(config) => ForwarderError::Configuration(config),
            other => ForwarderError::Build(other),
        }
    }
}

impl ForwarderError {
    /// HTTP status carried by an upstream rejection, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ForwarderError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
