pub mod request;
pub mod response;
pub mod tls;

pub use request::{
    BuildError, DEFAULT_HOST_NAME, FORMATTED_ENDPOINT_SUFFIX, JSON_CONTENT_TYPE, OutboundRequest,
    RAW_ENDPOINT_SUFFIX, RequestBuilder, local_host_name,
};
pub use response::{classify_response, is_failure_status};
pub use tls::{MutualTls, TlsError, Transport, TrustBase, TrustPool, build_transport};
