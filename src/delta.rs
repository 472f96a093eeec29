//! Inter-frame delta computation and reporting
//!
//! For a session with frames `F1..FN` the engine emits one block per adjacent
//! pair, each joint's delta being `older - newer`. The report layout is:
//!
//! ```text
//! -- Joint Frame Deltas --
//! date (DMY): 01012024    time (HMS): 120000
//!
//! Frames (1 - 2)
//!     joint  0 deltas >> x: 0.000   | y: 0.000   | z: 0.000
//!     ...
//!
//! ```

use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::codec;
use crate::store::SessionLogStore;
use crate::types::{CoordinateFrame, DeltaRecord, SessionId};
use crate::{PipelineError, Result};

const REPORT_TITLE: &str = "-- Joint Frame Deltas --";

/// Deltas for every adjacent pair, in frame order.
///
/// `N` frames give `max(N - 1, 0)` records.
pub fn compute_deltas(frames: &[CoordinateFrame]) -> Vec<DeltaRecord> {
    frames.windows(2).enumerate().map(|(i, pair)| DeltaRecord::between(i + 1, &pair[0], &pair[1])).collect()
}

/// Write the fixed report header for a session.
pub fn write_header<W: Write>(out: &mut W, session: &SessionId) -> std::io::Result<()> {
    writeln!(out, "{REPORT_TITLE}")?;
    writeln!(out, "date (DMY): {}    time (HMS): {}", session.date(), session.time())?;
    writeln!(out)
}

/// Write one pair block, including its trailing blank line.
pub fn write_record<W: Write>(out: &mut W, record: &DeltaRecord) -> std::io::Result<()> {
    let (older, newer) = record.frames();
    writeln!(out, "Frames ({older} - {newer})")?;
    for (j, d) in record.deltas.iter().enumerate() {
        writeln!(out, "    joint {j:2} deltas >> x:{:^8.3} | y:{:^8.3} | z:{:^8.3}", d.x, d.y, d.z)?;
    }
    writeln!(out)
}

/// Render a complete report in memory.
pub fn render_report(session: &SessionId, records: &[DeltaRecord]) -> String {
    let mut buf = Vec::new();
    // writes into a Vec cannot fail
    let _ = write_header(&mut buf, session);
    for record in records {
        let _ = write_record(&mut buf, record);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Outcome of processing one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaSummary {
    pub session: SessionId,
    pub frames: usize,
    pub records: usize,
    pub output: PathBuf,
}

/// Reads a session's coordinate log and writes its delta report
#[derive(Debug, Clone)]
pub struct DeltaEngine {
    store: SessionLogStore,
}

impl DeltaEngine {
    pub fn new(store: SessionLogStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionLogStore {
        &self.store
    }

    /// Compute and write the delta report for one session.
    ///
    /// Blank lines are skipped and do not count as frames; they still count
    /// toward the line numbers reported in errors.
    ///
    /// Blocks are streamed to the file as pairs become available. If a line
    /// fails to parse, everything written up to that point is flushed and kept,
    /// and the [`PipelineError::MalformedFrame`] (with its 1-based line number)
    /// is returned.
    pub fn process_session(&self, session: &SessionId) -> Result<DeltaSummary> {
        let lines = self.store.read_frames(session)?;
        let output = self.store.delta_log_path(session);
        info!("Computing deltas for session {} ({} lines)", session, lines.len());

        let mut out = self.store.create_delta_log(session)?;
        let io_err = |e: std::io::Error| PipelineError::file_error(output.clone(), e);

        write_header(&mut out, session).map_err(io_err)?;

        let mut previous: Option<CoordinateFrame> = None;
        let mut frames = 0usize;
        let mut records = 0usize;

        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                debug!("Skipping blank line {} in session {}", index + 1, session);
                continue;
            }

            let frame = match codec::parse(line) {
                Ok(frame) => frame,
                Err(e) => {
                    out.flush().map_err(io_err)?;
                    return Err(e.at_line(index + 1));
                }
            };
            frames += 1;

            if let Some(older) = previous.as_ref() {
                let record = DeltaRecord::between(frames - 1, older, &frame);
                write_record(&mut out, &record).map_err(io_err)?;
                records += 1;
            }
            previous = Some(frame);
        }

        out.flush().map_err(io_err)?;
        debug!("Session {}: {} frames, {} delta blocks", session, frames, records);

        Ok(DeltaSummary { session: session.clone(), frames, records, output })
    }
}
