use crate::domain::ForwarderError;
use reqwest::{Response, StatusCode};

/// Client- and server-error statuses (400..600) fail the delivery; anything
/// else counts as delivered.
pub fn is_failure_status(status: StatusCode) -> bool {
    (400..600).contains(&status.as_u16())
}

/// Classify a collector response. On failure the body is read best-effort and
/// attached to the error; an unreadable body becomes an empty string.
pub async fn classify_response(response: Response) -> Result<StatusCode, ForwarderError> {
    let status = response.status();
    if !is_failure_status(status) {
        return Ok(status);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ForwarderError::UpstreamStatus {
        status: status.as_u16(),
        body,
    })
}
