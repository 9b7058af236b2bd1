use super::{LogFormat, LogLevel};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Process-level knobs. Forwarding settings come from the environment via
/// [`super::ForwardingConfig`].
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// S3 event notification document to forward ("-" reads stdin)
    #[arg(long, env = "FORWARDER_EVENT_FILE", default_value = "-")]
    pub event_file: PathBuf,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn reads_stdin(&self) -> bool {
        self.event_file == Path::new("-")
    }
}
