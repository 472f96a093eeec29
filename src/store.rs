//! Per-session log files
//!
//! Each session owns `<coordinate_dir>/<id>_coordinates.log` (one rendered frame
//! per line, append-only) and, once processed, `<delta_dir>/<id>_deltas.log`.
//! There is no locking: one writer per session is assumed.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::codec;
use crate::config::LogConfig;
use crate::types::{CoordinateFrame, SessionId};
use crate::{PipelineError, Result};

const COORDINATE_SUFFIX: &str = "_coordinates.log";
const DELTA_SUFFIX: &str = "_deltas.log";

/// Which family of log files to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Coordinate,
    Delta,
}

/// Result of a best-effort append
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The frame is on disk
    Persisted,
    /// The frame was lost; `reason` describes the I/O failure
    Dropped { reason: String },
}

impl AppendOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, AppendOutcome::Persisted)
    }
}

/// File-backed store of coordinate and delta logs
#[derive(Debug, Clone)]
pub struct SessionLogStore {
    config: LogConfig,
}

impl SessionLogStore {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Path of a session's coordinate log
    pub fn coordinate_log_path(&self, session: &SessionId) -> PathBuf {
        self.config.coordinate_dir.join(format!("{session}{COORDINATE_SUFFIX}"))
    }

    /// Path of a session's delta log
    pub fn delta_log_path(&self, session: &SessionId) -> PathBuf {
        self.config.delta_dir.join(format!("{session}{DELTA_SUFFIX}"))
    }

    /// Append one frame to the session's coordinate log.
    ///
    /// Never fails: an I/O error is logged and reported as
    /// [`AppendOutcome::Dropped`] so the real-time path keeps running.
    pub fn append(&self, session: &SessionId, frame: &CoordinateFrame) -> AppendOutcome {
        self.append_line(session, &codec::render(frame))
    }

    /// Append an already rendered frame line.
    pub fn append_line(&self, session: &SessionId, line: &str) -> AppendOutcome {
        let path = self.coordinate_log_path(session);
        match write_line(&self.config.coordinate_dir, &path, line) {
            Ok(()) => {
                trace!("Appended frame to {}", path.display());
                AppendOutcome::Persisted
            }
            Err(e) => {
                warn!("Dropping frame for session {}: {}", session, e);
                AppendOutcome::Dropped { reason: e.to_string() }
            }
        }
    }

    /// Read every line of a session's coordinate log, oldest first.
    pub fn read_frames(&self, session: &SessionId) -> Result<Vec<String>> {
        let path = self.coordinate_log_path(session);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::SessionNotFound { session: session.to_string(), path: path.clone() }
            } else {
                PipelineError::file_error(path.clone(), e)
            }
        })?;

        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| PipelineError::file_error(path.clone(), e))?;

        debug!("Read {} lines from {}", lines.len(), path.display());
        Ok(lines)
    }

    /// Whether a log of the given kind exists for the session
    pub fn has_log(&self, kind: LogKind, session: &SessionId) -> bool {
        match kind {
            LogKind::Coordinate => self.coordinate_log_path(session).is_file(),
            LogKind::Delta => self.delta_log_path(session).is_file(),
        }
    }

    /// Session ids that currently have a log of the given kind.
    ///
    /// The id is the file stem up to the first `_`; files whose stem is not a
    /// valid session id are skipped. A missing directory yields an empty set.
    pub fn list_session_ids(&self, kind: LogKind) -> Result<BTreeSet<SessionId>> {
        let dir = match kind {
            LogKind::Coordinate => &self.config.coordinate_dir,
            LogKind::Delta => &self.config.delta_dir,
        };

        let mut ids = BTreeSet::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(PipelineError::file_error(dir.clone(), e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::file_error(dir.clone(), e))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("log") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let candidate = stem.split('_').next().unwrap_or(stem);
            match SessionId::parse(candidate) {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(_) => debug!("Skipping log with unrecognised name: {}", path.display()),
            }
        }

        Ok(ids)
    }

    /// Create (or truncate) a session's delta log for writing.
    pub fn create_delta_log(&self, session: &SessionId) -> Result<BufWriter<File>> {
        let dir = &self.config.delta_dir;
        fs::create_dir_all(dir).map_err(|e| PipelineError::file_error(dir.clone(), e))?;

        let path = self.delta_log_path(session);
        let file = File::create(&path).map_err(|e| PipelineError::file_error(path, e))?;
        Ok(BufWriter::new(file))
    }
}

fn write_line(dir: &Path, path: &Path, line: &str) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()
}
