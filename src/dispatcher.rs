//! Per-record forwarding: skip directory markers, fetch, build, send, classify.
//!
//! Records are processed strictly in order and the first failure ends the
//! batch. Nothing is retried.

use crate::domain::{ForwarderError, NotificationRecord};
use crate::sender::{RequestBuilder, Transport, classify_response};
use crate::storage::ObjectStore;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Terminal state of a record that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Directory marker; nothing fetched or sent.
    Skipped,
    Delivered { status: StatusCode },
}

/// Counts for a batch that completed without error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub skipped: usize,
}

pub struct Dispatcher<S> {
    store: S,
    transport: Transport,
    builder: RequestBuilder,
}

impl<S: ObjectStore> Dispatcher<S> {
    pub fn new(store: S, transport: Transport, builder: RequestBuilder) -> Self {
        Self {
            store,
            transport,
            builder,
        }
    }

    pub async fn dispatch_record(
        &self,
        record: &NotificationRecord,
    ) -> Result<RecordOutcome, ForwarderError> {
        if record.is_directory_marker() {
            debug!("Skipping directory marker s3://{}/{}", record.bucket, record.key);
            return Ok(RecordOutcome::Skipped);
        }

        let content = self
            .store
            .get_object(&record.bucket, &record.key)
            .await
            .inspect_err(|e| debug!("error fetching s3 object: {}", e))?;

        let request = self
            .builder
            .build(record, content)
            .inspect_err(|e| debug!("error building http request: {}", e))?;

        let response = request
            .into_request_builder(self.transport.client())
            .send()
            .await
            .inspect_err(|e| debug!("error making http call: {}", e))?;

        let status = classify_response(response).await?;
        debug!(
            "Delivered s3://{}/{} (HTTP {})",
            record.bucket,
            record.key,
            status.as_u16()
        );

        Ok(RecordOutcome::Delivered { status })
    }

    pub async fn dispatch_batch(
        &self,
        records: &[NotificationRecord],
    ) -> Result<DispatchSummary, ForwarderError> {
        self.dispatch_batch_until(records, &CancellationToken::new())
            .await
    }

    /// Like [`Self::dispatch_batch`], but an in-flight record is abandoned as
    /// soon as `cancel` fires. Records already delivered stay delivered.
    pub async fn dispatch_batch_until(
        &self,
        records: &[NotificationRecord],
        cancel: &CancellationToken,
    ) -> Result<DispatchSummary, ForwarderError> {
        info!("receiving S3 Event records. Count: {}", records.len());

        let mut summary = DispatchSummary::default();
        for (position, record) in records.iter().enumerate() {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => Err(ForwarderError::Cancelled),
                result = self.dispatch_record(record) => result,
            };

            match outcome {
                Ok(RecordOutcome::Skipped) => summary.skipped += 1,
                Ok(RecordOutcome::Delivered { .. }) => summary.delivered += 1,
                Err(e) => {
                    error!(
                        position,
                        bucket = %record.bucket,
                        key = %record.key,
                        "Stopping batch: {}",
                        e
                    );
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }
}
