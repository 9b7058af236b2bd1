mod cli;
pub mod env_source;
mod forwarding;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} has not been provided")]
    MissingSetting(&'static str),
    #[error("{0} is not supported. Only GZIP is supported")]
    UnsupportedEncoding(String),
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Failed to read {name} from {path}: {source}")]
    SecretFile {
        name: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Output format of the process log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line (default for deployed functions)
    #[default]
    Json,
    /// Human-readable single-line output
    Compact,
}

/// Wire shape of the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// JSON envelope POSTed to `/services/collector`
    #[default]
    Structured,
    /// Object bytes POSTed verbatim to `/services/collector/raw`, metadata in the query
    Raw,
}

impl DeliveryMode {
    pub fn is_raw(self) -> bool {
        self == DeliveryMode::Raw
    }
}

pub use cli::Cli;
pub use forwarding::{
    CA_CERT_ENV, CLIENT_CERT_ENV, CLIENT_KEY_ENV, DEFAULT_INDEX, DEFAULT_SOURCETYPE,
    DESTINATION_ENV, ENCODING_METHOD_ENV, EVENT_IS_RAW_ENV, ForwardingConfig, INDEX_ENV,
    SOURCETYPE_ENV, SUPPORTED_ENCODING, TlsMaterial,
};
