use crate::app::config::{
    ConfigError, DESTINATION_ENV, DeliveryMode, ForwardingConfig, SUPPORTED_ENCODING,
};
use crate::domain::{NotificationRecord, OutboundEnvelope};
use bytes::Bytes;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use std::ffi::OsString;
use thiserror::Error;
use url::Url;

pub const FORMATTED_ENDPOINT_SUFFIX: &str = "/services/collector";
pub const RAW_ENDPOINT_SUFFIX: &str = "/services/collector/raw";
pub const DEFAULT_HOST_NAME: &str = "unknownHost";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to serialize event envelope: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Fully formed outbound request. Building one does no I/O.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundRequest {
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn into_request_builder(self, client: &Client) -> reqwest::RequestBuilder {
        client
            .request(self.method, self.url)
            .headers(self.headers)
            .body(self.body)
    }
}

/// Local host name, or [`DEFAULT_HOST_NAME`] when it cannot be determined.
pub fn local_host_name() -> String {
    host_name_or_default(hostname::get())
}

/// Failed lookups, non-UTF-8 names and empty names all become
/// [`DEFAULT_HOST_NAME`].
fn host_name_or_default(lookup: std::io::Result<OsString>) -> String {
    lookup
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST_NAME.to_string())
}

/// Turns a notification record plus fetched object bytes into the HEC request
/// for the configured delivery mode.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: ForwardingConfig,
    host_name: String,
}

impl RequestBuilder {
    pub fn new(config: ForwardingConfig) -> Self {
        Self {
            config,
            host_name: local_host_name(),
        }
    }

    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn build(
        &self,
        record: &NotificationRecord,
        content: Bytes,
    ) -> Result<OutboundRequest, BuildError> {
        if self.config.destination.is_empty() {
            return Err(ConfigError::MissingSetting(DESTINATION_ENV).into());
        }

        let sourcetype = self.config.resolved_sourcetype();
        let index = self.config.resolved_index();

        let url = self.build_url(&record.source, sourcetype, index)?;
        let body = self.build_body(record, content, sourcetype, index)?;
        let headers = self.build_headers()?;

        Ok(OutboundRequest {
            method: Method::POST,
            url,
            headers,
            body,
        })
    }

    fn build_url(&self, source: &str, sourcetype: &str, index: &str) -> Result<Url, ConfigError> {
        let mut url =
            Url::parse(&self.config.destination).map_err(|e| ConfigError::InvalidUrl {
                url: self.config.destination.clone(),
                reason: e.to_string(),
            })?;

        match self.config.delivery_mode {
            DeliveryMode::Structured => {
                url.set_path(FORMATTED_ENDPOINT_SUFFIX);
            }
            DeliveryMode::Raw => {
                url.set_path(RAW_ENDPOINT_SUFFIX);
                set_metadata_query(
                    &mut url,
                    [
                        ("host", self.host_name.as_str()),
                        ("source", source),
                        ("sourcetype", sourcetype),
                        ("index", index),
                    ],
                );
            }
        }

        Ok(url)
    }

    fn build_body(
        &self,
        record: &NotificationRecord,
        content: Bytes,
        sourcetype: &str,
        index: &str,
    ) -> Result<Bytes, serde_json::Error> {
        if self.config.delivery_mode.is_raw() {
            return Ok(content);
        }

        let envelope = OutboundEnvelope {
            time: record.event_epoch_seconds(),
            host: self.host_name.clone(),
            source: record.source.clone(),
            sourcetype: sourcetype.to_string(),
            index: index.to_string(),
            event: String::from_utf8_lossy(&content).into_owned(),
        };
        envelope.to_json_bytes().map(Bytes::from)
    }

    fn build_headers(&self) -> Result<HeaderMap, ConfigError> {
        let mut headers = HeaderMap::new();

        if let Some(encoding) = self.config.encoding_method.as_deref().filter(|e| !e.is_empty()) {
            if encoding != SUPPORTED_ENCODING {
                return Err(ConfigError::UnsupportedEncoding(encoding.to_string()));
            }
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(SUPPORTED_ENCODING));
        }

        // Sent in raw mode too; the collector contract expects it.
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        Ok(headers)
    }
}

/// Replaces the metadata keys in the query, keeping any other parameters the
/// destination already carried, and emits all pairs sorted by key.
fn set_metadata_query(url: &mut Url, metadata: [(&str, &str); 4]) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !metadata.iter().any(|(name, _)| key == name))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    pairs.extend(
        metadata
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string())),
    );
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    url.query_pairs_mut().clear().extend_pairs(pairs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::{DEFAULT_INDEX, DEFAULT_SOURCETYPE};
    use chrono::{TimeZone, Utc};

    fn record() -> NotificationRecord {
        NotificationRecord::new("test-bucket", "test-key")
            .with_source("test-source")
            .with_event_time(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    fn builder(config: ForwardingConfig) -> RequestBuilder {
        RequestBuilder::new(config).with_host_name("test-host")
    }

    #[test]
    fn test_structured_request_defaults() {
        let config = ForwardingConfig::default().with_destination("http://localhost");
        let request = builder(config)
            .build(&record(), Bytes::from_static(b"s3-content"))
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "http://localhost/services/collector");
        assert_eq!(request.url.query(), None);
        assert_eq!(request.header_str("content-type"), Some("application/json"));
        assert_eq!(request.header_str("content-encoding"), None);

        let envelope: OutboundEnvelope = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(envelope.time, 1_704_164_645);
        assert_eq!(envelope.host, "test-host");
        assert_eq!(envelope.source, "test-source");
        assert_eq!(envelope.sourcetype, DEFAULT_SOURCETYPE);
        assert_eq!(envelope.index, DEFAULT_INDEX);
        assert_eq!(envelope.event, "s3-content");
    }

    #[test]
    fn test_raw_request_forwards_bytes_verbatim() {
        let config = ForwardingConfig::default()
            .with_destination("http://localhost")
            .with_delivery_mode(DeliveryMode::Raw);
        let content = Bytes::from_static(b"{not json}\n\xff\x00binary");
        let request = builder(config).build(&record(), content.clone()).unwrap();

        assert_eq!(request.body, content);
        assert_eq!(request.url.path(), RAW_ENDPOINT_SUFFIX);
        assert_eq!(
            request.url.query(),
            Some("host=test-host&index=main&source=test-source&sourcetype=archived_data")
        );
        assert_eq!(request.header_str("content-type"), Some("application/json"));
    }

    #[test]
    fn test_raw_query_is_percent_encoded() {
        let config = ForwardingConfig {
            sourcetype: Some("my type/v1".to_string()),
            index: Some("a&b=c".to_string()),
            ..ForwardingConfig::default()
        }
        .with_destination("https://hec.example.com:8088")
        .with_delivery_mode(DeliveryMode::Raw);
        let record = NotificationRecord::new("bucket", "key").with_source("aws:s3");

        let request = builder(config).build(&record, Bytes::new()).unwrap();
        let query = request.url.query().unwrap();
        assert!(query.contains("index=a%26b%3Dc"));
        assert!(query.contains("source=aws%3As3"));

        let decoded: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        assert!(decoded.contains(&("sourcetype".to_string(), "my type/v1".to_string())));
        assert!(decoded.contains(&("index".to_string(), "a&b=c".to_string())));
    }

    #[test]
    fn test_raw_query_keeps_unrelated_destination_params() {
        let config = ForwardingConfig::default()
            .with_destination("http://localhost?channel=abc&host=stale")
            .with_delivery_mode(DeliveryMode::Raw);

        let request = builder(config).build(&record(), Bytes::new()).unwrap();
        let decoded: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        assert_eq!(decoded[0], ("channel".to_string(), "abc".to_string()));
        assert_eq!(decoded.iter().filter(|(k, _)| k == "host").count(), 1);
        assert!(decoded.contains(&("host".to_string(), "test-host".to_string())));
    }

    #[test]
    fn test_destination_path_is_replaced() {
        let config =
            ForwardingConfig::default().with_destination("http://localhost/services/collector");
        let request = builder(config).build(&record(), Bytes::new()).unwrap();
        assert_eq!(request.url.as_str(), "http://localhost/services/collector");
    }

    #[test]
    fn test_missing_destination_is_config_error() {
        let err = builder(ForwardingConfig::default().with_encoding_method("zstd"))
            .build(&record(), Bytes::new())
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::MissingSetting(DESTINATION_ENV))
        ));
        assert_eq!(err.to_string(), "EDGE_PROCESSOR_HOST has not been provided");
    }

    #[test]
    fn test_invalid_destination_is_config_error() {
        let config = ForwardingConfig::default().with_destination("not a url");
        let err = builder(config).build(&record(), Bytes::new()).unwrap_err();
        assert!(matches!(err, BuildError::Config(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_gzip_encoding_sets_header() {
        let config = ForwardingConfig::default()
            .with_destination("http://localhost")
            .with_encoding_method("gzip");
        let request = builder(config).build(&record(), Bytes::new()).unwrap();
        assert_eq!(request.header_str("content-encoding"), Some("gzip"));
    }

    #[test]
    fn test_unsupported_encoding_names_value() {
        for value in ["deflate", "GZIP", "br"] {
            let config = ForwardingConfig::default()
                .with_destination("http://localhost")
                .with_encoding_method(value);
            let err = builder(config).build(&record(), Bytes::new()).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("{value} is not supported. Only GZIP is supported")
            );
        }
    }

    #[test]
    fn test_empty_encoding_is_ignored() {
        let config = ForwardingConfig::default()
            .with_destination("http://localhost")
            .with_encoding_method("");
        let request = builder(config).build(&record(), Bytes::new()).unwrap();
        assert_eq!(request.header_str("content-encoding"), None);
    }

    #[test]
    fn test_empty_content_and_unset_time() {
        let config = ForwardingConfig::default().with_destination("http://localhost");
        let record = NotificationRecord::new("bucket", "key");
        let request = builder(config).build(&record, Bytes::new()).unwrap();

        let envelope: OutboundEnvelope = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(envelope.event, "");
        assert_eq!(envelope.time, crate::domain::UNSET_EVENT_TIME_SECS);
    }

    #[test]
    fn test_local_host_name_never_empty() {
        assert!(!local_host_name().is_empty());
    }

    #[test]
    fn test_host_name_lookup_failure_uses_sentinel() {
        let failed = Err(std::io::Error::other("lookup failed"));
        assert_eq!(host_name_or_default(failed), DEFAULT_HOST_NAME);
        assert_eq!(host_name_or_default(Ok(OsString::new())), DEFAULT_HOST_NAME);
        assert_eq!(host_name_or_default(Ok(OsString::from("ip-10-0-0-1"))), "ip-10-0-0-1");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_host_name_uses_sentinel() {
        use std::os::unix::ffi::OsStringExt;

        let name = OsString::from_vec(vec![0x68, 0x6f, 0xff, 0x73, 0x74]);
        assert_eq!(host_name_or_default(Ok(name)), DEFAULT_HOST_NAME);
    }
}
