//! Domain layer for s3-hec-forwarder.
//!
//! Contains the canonical types shared across all modules:
//! - `NotificationRecord`: one object-change notification, the unit of forwarding
//! - `EventNotification`: the S3 notification document a batch arrives in
//! - `OutboundEnvelope`: the structured-mode HEC event body
//! - `ForwarderError`: Top-level error type

pub mod envelope;
pub mod error;
pub mod notification;

pub use envelope::OutboundEnvelope;
pub use error::ForwarderError;
pub use notification::{
    DIRECTORY_MARKER_SUFFIX, EventNotification, NotificationRecord, UNSET_EVENT_TIME_SECS,
};
