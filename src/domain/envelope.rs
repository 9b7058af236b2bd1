use serde::{Deserialize, Serialize};

/// Structured-mode request body understood by the HEC `/services/collector`
/// endpoint.
///
/// Field names go over the wire in PascalCase (`Time`, `Host`, `Source`,
/// `Sourcetype`, `Index`, `Event`) and in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundEnvelope {
    /// Event time in whole seconds since the Unix epoch.
    pub time: i64,
    pub host: String,
    pub source: String,
    pub sourcetype: String,
    pub index: String,
    /// Object content as text.
    pub event: String,
}

impl OutboundEnvelope {
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
