pub mod config;
pub mod logging_system;

pub use config::{Cli, ConfigError, DeliveryMode, ForwardingConfig, LogFormat, LogLevel};
pub use logging_system::setup_logging_safe;

use crate::dispatcher::{DispatchSummary, Dispatcher};
use crate::domain::{EventNotification, ForwarderError, NotificationRecord};
use crate::sender::{RequestBuilder, build_transport};
use crate::storage::{ObjectStore, S3ObjectStore};
use clap::Parser;
use std::process;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read event document {path}: {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid event document: {0}")]
    Document(#[from] serde_json::Error),
    #[error(transparent)]
    Forwarding(#[from] ForwarderError),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Forwarding(err.into())
    }
}

/// Forwards one batch of notifications.
///
/// The transport is built once and shared by every record; the config is
/// owned by this call and dropped with it.
pub async fn run_invocation<S: ObjectStore>(
    config: ForwardingConfig,
    store: S,
    records: &[NotificationRecord],
    cancel: &CancellationToken,
) -> Result<DispatchSummary, ForwarderError> {
    let transport = build_transport(&config.tls).inspect_err(|e| {
        error!("error building http client: {}", e);
    })?;
    let builder = RequestBuilder::new(config);

    Dispatcher::new(store, transport, builder)
        .dispatch_batch_until(records, cancel)
        .await
}

pub struct App {
    cli: Cli,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self {
            cli: Cli::try_parse_from(args)?,
        })
    }

    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    pub async fn run(self) -> Result<DispatchSummary, AppError> {
        let document = self.read_event_document().await?;
        let records = EventNotification::from_json(&document)?.into_records();

        let config = ForwardingConfig::from_env()?;
        info!(
            "Configuration: destination={}, mode={:?}, mutual_tls={}",
            config.destination,
            config.delivery_mode,
            config.tls.client_pair().is_some()
        );

        let store = S3ObjectStore::from_env().await;

        let cancel = CancellationToken::new();
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, abandoning in-flight record");
                signal_token.cancel();
            }
        });

        let summary = run_invocation(config, store, &records, &cancel).await?;
        Ok(summary)
    }

    async fn read_event_document(&self) -> Result<Vec<u8>, AppError> {
        let path = self.cli.event_file.display().to_string();
        let input_error = |source| AppError::Input {
            path: path.clone(),
            source,
        };

        if self.cli.reads_stdin() {
            let mut buffer = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buffer)
                .await
                .map_err(input_error)?;
            Ok(buffer)
        } else {
            tokio::fs::read(&self.cli.event_file)
                .await
                .map_err(input_error)
        }
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the application
pub async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = match App::from_args(std::env::args_os()) {
        Ok(app) => app,
        Err(e) => e.exit(),
    };

    setup_logging_safe(app.cli().log_level, app.cli().log_format);
    info!("Starting s3-hec-forwarder v{}", get_version());

    match app.run().await {
        Ok(summary) => {
            info!(
                "Batch forwarded: {} delivered, {} skipped",
                summary.delivered, summary.skipped
            );
            Ok(())
        }
        Err(e) => {
            error!("Invocation failed: {}", e);
            process::exit(1);
        }
    }
}
