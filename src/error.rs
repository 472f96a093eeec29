//! Error types for the coordinate pipeline.
//!
//! Every fallible operation in the crate returns [`PipelineError`]. Variants carry
//! structured context (paths, session ids, line numbers) so callers can decide
//! whether to retry, skip a session, or surface the failure.
//!
//! ## Error Categories
//!
//! - **Frame Errors**: a logged or received line violates the frame grammar
//! - **Session Errors**: unknown or malformed session ids
//! - **Transport Errors**: connect/write failures, timeouts and cancellation
//! - **File Errors**: log and delta-report I/O failures
//! - **Configuration Errors**: unreadable or invalid configuration files
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use posetrail::PipelineError;
//!
//! let error = PipelineError::connection_failed("remote endpoint refused connection");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```
//!
//! ## Helper Constructors
//!
//! ```rust
//! use posetrail::PipelineError;
//! use std::path::PathBuf;
//!
//! let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
//! let file_error = PipelineError::file_error(PathBuf::from("logs/a.log"), io_err);
//!
//! let frame_error = PipelineError::malformed_frame("expected 3 fields, found 2");
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("Malformed frame{}: {details}", line_suffix(.line))]
    MalformedFrame { line: Option<usize>, details: String },

    #[error("No coordinate log for session {session} at {path}")]
    SessionNotFound { session: String, path: PathBuf },

    #[error("Invalid session id '{value}': expected <digits>-<digits>")]
    InvalidSessionId { value: String },

    #[error("Failed to reach frame consumer: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Log file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {details}")]
    Config { details: String },

    #[error("Payload of {len} bytes does not fit the 32-bit length field")]
    PayloadTooLarge { len: usize },

    #[error("Triangulation failed: {reason}")]
    Collaborator { reason: String },

    #[error("Blocking send called from inside a tokio runtime")]
    NestedRuntime,
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {line}"),
        None => String::new(),
    }
}

impl PipelineError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Connection { .. } => true,
            PipelineError::Timeout { .. } => true,
            PipelineError::File { .. } => true,
            PipelineError::Collaborator { .. } => true,
            PipelineError::MalformedFrame { .. } => false,
            PipelineError::SessionNotFound { .. } => false,
            PipelineError::InvalidSessionId { .. } => false,
            PipelineError::Cancelled => false,
            PipelineError::Config { .. } => false,
            PipelineError::PayloadTooLarge { .. } => false,
            PipelineError::NestedRuntime => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PipelineError::MalformedFrame { .. } => vec![
                "Inspect the reported line of the coordinate log",
                "Check the upstream pose stage emits 25 joints of 3 values",
                "Remove or repair truncated lines left by an interrupted run",
            ],
            PipelineError::SessionNotFound { .. } => vec![
                "Check the session id spelling",
                "Verify the configured coordinate log directory",
            ],
            PipelineError::InvalidSessionId { .. } => vec![
                "Use the <DDMMYYYY>-<HHMMSS> session id format",
                "Rename log files that do not follow the naming convention",
            ],
            PipelineError::Connection { .. } => vec![
                "Ensure the frame consumer is listening",
                "Verify the configured host and port",
                "Check firewall rules between sender and consumer",
            ],
            PipelineError::Timeout { .. } => vec![
                "Increase the transport timeouts",
                "Check the consumer is draining its socket",
            ],
            PipelineError::Cancelled => vec!["Re-run the operation if cancellation was unintended"],
            PipelineError::File { .. } => vec![
                "Check the log directories exist and are writable",
                "Ensure sufficient disk space",
                "Check file permissions",
            ],
            PipelineError::Config { .. } => vec![
                "Validate the configuration file syntax",
                "Compare field names against the documented configuration",
            ],
            PipelineError::PayloadTooLarge { .. } => {
                vec!["Send one frame per message", "Check the payload is a single rendered frame"]
            }
            PipelineError::Collaborator { .. } => vec![
                "Verify the stereo calibration is current",
                "Check both images and joint sets belong to the same instant",
            ],
            PipelineError::NestedRuntime => {
                vec!["Use the async send API from async code", "Move the blocking call to a plain thread"]
            }
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        PipelineError::File { path, source }
    }

    /// Helper constructor for frame grammar violations without line context.
    pub fn malformed_frame(details: impl Into<String>) -> Self {
        PipelineError::MalformedFrame { line: None, details: details.into() }
    }

    /// Attach a 1-based line number to a frame error. Other errors pass through.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            PipelineError::MalformedFrame { details, .. } => {
                PipelineError::MalformedFrame { line: Some(line), details }
            }
            other => other,
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        PipelineError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        PipelineError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(details: impl Into<String>) -> Self {
        PipelineError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for PipelineError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        PipelineError::Config { details: err.to_string() }
    }
}
