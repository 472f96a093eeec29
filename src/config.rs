//! Pipeline configuration
//!
//! All locations and endpoints are passed to components at construction time.
//! A configuration file is YAML; every field is optional and falls back to the
//! defaults below.
//!
//! ```yaml
//! logs:
//!   coordinate_dir: logs/coordinate_logs
//!   delta_dir: logs/delta_logs
//! transport:
//!   host: 192.168.1.20
//!   port: 8080
//!   connect_timeout_ms: 3000
//!   send_timeout_ms: 10000
//! processing:
//!   session_match: Exact
//!   failure_policy: SkipAndContinue
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::{PipelineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub logs: LogConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Where session logs live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_coordinate_dir")]
    pub coordinate_dir: PathBuf,
    #[serde(default = "default_delta_dir")]
    pub delta_dir: PathBuf,
}

/// Remote frame consumer endpoint and send deadlines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deadline for establishing the connection
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Deadline for the whole connect/write/drain sequence
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

/// Offline delta processing behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub session_match: SessionMatch,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// How a delta log is matched to its coordinate session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMatch {
    /// Delta log id must equal the coordinate session id
    #[default]
    Exact,
    /// Any delta log whose id contains the coordinate session id counts
    Substring,
}

/// What a batch run does when one session fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next session
    #[default]
    SkipAndContinue,
    /// Stop the batch at the first failed session
    AbortBatch,
}

fn default_coordinate_dir() -> PathBuf {
    PathBuf::from("logs/coordinate_logs")
}

fn default_delta_dir() -> PathBuf {
    PathBuf::from("logs/delta_logs")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_send_timeout_ms() -> u64 {
    10_000
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { coordinate_dir: default_coordinate_dir(), delta_dir: default_delta_dir() }
    }
}

impl LogConfig {
    /// Both log directories under a common root
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self { coordinate_dir: root.join("coordinate_logs"), delta_dir: root.join("delta_logs") }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl TransportConfig {
    /// Endpoint with default deadlines
    pub fn endpoint(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port, ..Self::default() }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// `host:port` for diagnostics
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PipelineError::file_error(path.to_path_buf(), e))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.transport.host.trim().is_empty() {
            return Err(PipelineError::config_error("transport.host must not be empty"));
        }
        if self.transport.connect_timeout_ms == 0 || self.transport.send_timeout_ms == 0 {
            return Err(PipelineError::config_error("transport timeouts must be non-zero"));
        }
        if self.logs.coordinate_dir == self.logs.delta_dir {
            return Err(PipelineError::config_error(
                "coordinate and delta logs must live in different directories",
            ));
        }
        Ok(())
    }
}
