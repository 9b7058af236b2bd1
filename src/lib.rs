#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
#![allow(
    clippy::missing_errors_doc,      // Internal API
    clippy::missing_panics_doc,      // Internal API
    clippy::module_name_repetitions, // e.g. StorageError in storage module
    clippy::must_use_candidate,      // Annotated selectively on critical APIs
    clippy::doc_markdown             // Internal API
)]

pub mod app;
pub mod dispatcher;
pub mod domain;
pub mod sender;
pub mod storage;

// Re-export main types for easy access
pub use app::{App, ForwardingConfig};
pub use dispatcher::{DispatchSummary, Dispatcher, RecordOutcome};
pub use domain::{ForwarderError, NotificationRecord};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
