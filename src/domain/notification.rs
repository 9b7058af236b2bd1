use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keys ending with this suffix are directory placeholders, not content.
pub const DIRECTORY_MARKER_SUFFIX: &str = "/";

/// Epoch seconds reported for a record that carries no event time
/// (0001-01-01T00:00:00Z).
pub const UNSET_EVENT_TIME_SECS: i64 = -62_135_596_800;

/// One created/changed object, as handed over by the notification fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub bucket: String,
    pub key: String,
    /// Source identifier of the notification (e.g. `aws:s3`).
    pub source: String,
    pub event_time: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            source: String::new(),
            event_time: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_event_time(mut self, event_time: DateTime<Utc>) -> Self {
        self.event_time = Some(event_time);
        self
    }

    pub fn is_directory_marker(&self) -> bool {
        self.key.ends_with(DIRECTORY_MARKER_SUFFIX)
    }

    /// Event time as whole epoch seconds; unset maps to [`UNSET_EVENT_TIME_SECS`].
    pub fn event_epoch_seconds(&self) -> i64 {
        self.event_time
            .map_or(UNSET_EVENT_TIME_SECS, |time| time.timestamp())
    }
}

/// S3 event notification document: `{"Records": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(default)]
    pub event_source: String,
    #[serde(default)]
    pub event_time: Option<DateTime<Utc>>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    pub key: String,
}

impl EventNotification {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Records in delivery order.
    pub fn into_records(self) -> Vec<NotificationRecord> {
        self.records.into_iter().map(NotificationRecord::from).collect()
    }
}

impl From<S3EventRecord> for NotificationRecord {
    fn from(record: S3EventRecord) -> Self {
        Self {
            bucket: record.s3.bucket.name,
            key: record.s3.object.key,
            source: record.event_source,
            event_time: record.event_time,
        }
    }
}
