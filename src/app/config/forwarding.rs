use super::env_source::{
    EnvSource, ProcessEnv, load_env_flag, load_env_secret, load_env_string_opt,
};
use super::{ConfigError, DeliveryMode};
use std::fmt;

pub const DESTINATION_ENV: &str = "EDGE_PROCESSOR_HOST";
pub const CLIENT_CERT_ENV: &str = "TLS_CLIENT_CERT";
pub const CLIENT_KEY_ENV: &str = "TLS_CLIENT_KEY";
pub const CA_CERT_ENV: &str = "TLS_CLIENT_CA_CERT";
pub const ENCODING_METHOD_ENV: &str = "ENCODING_METHOD";
pub const SOURCETYPE_ENV: &str = "EVENT_SOURCETYPE";
pub const INDEX_ENV: &str = "EVENT_INDEX";
pub const EVENT_IS_RAW_ENV: &str = "EVENT_IS_RAW";

pub const DEFAULT_SOURCETYPE: &str = "archived_data";
pub const DEFAULT_INDEX: &str = "main";
pub const SUPPORTED_ENCODING: &str = "gzip";

/// PEM material for mutual TLS. Any field may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TlsMaterial {
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub ca_cert: Option<String>,
}

impl TlsMaterial {
    /// Certificate and key, only when both are present and non-empty.
    pub fn client_pair(&self) -> Option<(&str, &str)> {
        match (self.client_cert.as_deref(), self.client_key.as_deref()) {
            (Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => Some((cert, key)),
            _ => None,
        }
    }
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("client_cert", &self.client_cert.as_ref().map(|_| "<pem>"))
            .field("client_key", &self.client_key.as_ref().map(|_| "<redacted>"))
            .field("ca_cert", &self.ca_cert.as_ref().map(|_| "<pem>"))
            .finish()
    }
}

/// Settings for one invocation. Loaded once, then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardingConfig {
    /// Base URL of the HEC endpoint; the collector path is appended per mode.
    pub destination: String,
    pub delivery_mode: DeliveryMode,
    pub sourcetype: Option<String>,
    pub index: Option<String>,
    /// Content-encoding label; validated when a request is built.
    pub encoding_method: Option<String>,
    pub tls: TlsMaterial,
}

impl ForwardingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_source(&lookup)
    }

    pub fn from_source(env: &impl EnvSource) -> Result<Self, ConfigError> {
        let delivery_mode = if load_env_flag(env, EVENT_IS_RAW_ENV) {
            DeliveryMode::Raw
        } else {
            DeliveryMode::Structured
        };

        Ok(Self {
            destination: load_env_string_opt(env, DESTINATION_ENV).unwrap_or_default(),
            delivery_mode,
            sourcetype: load_env_string_opt(env, SOURCETYPE_ENV),
            index: load_env_string_opt(env, INDEX_ENV),
            encoding_method: load_env_string_opt(env, ENCODING_METHOD_ENV),
            tls: TlsMaterial {
                client_cert: load_env_secret(env, CLIENT_CERT_ENV)?,
                client_key: load_env_secret(env, CLIENT_KEY_ENV)?,
                ca_cert: load_env_secret(env, CA_CERT_ENV)?,
            },
        })
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_delivery_mode(mut self, delivery_mode: DeliveryMode) -> Self {
        self.delivery_mode = delivery_mode;
        self
    }

    pub fn with_encoding_method(mut self, encoding_method: impl Into<String>) -> Self {
        self.encoding_method = Some(encoding_method.into());
        self
    }

    pub fn with_tls(mut self, tls: TlsMaterial) -> Self {
        self.tls = tls;
        self
    }

    pub fn resolved_sourcetype(&self) -> &str {
        self.sourcetype
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SOURCETYPE)
    }

    pub fn resolved_index(&self) -> &str {
        self.index
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_INDEX)
    }
}
