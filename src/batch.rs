//! Batch delta processing over every unprocessed session

use tracing::{error, info};

use crate::config::{FailurePolicy, SessionMatch};
use crate::delta::{DeltaEngine, DeltaSummary};
use crate::scanner::SessionScanner;
use crate::store::SessionLogStore;
use crate::types::SessionId;
use crate::{PipelineError, Result};

/// What happened during one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<DeltaSummary>,
    pub failed: Vec<(SessionId, PipelineError)>,
    /// Sessions not attempted because the batch stopped early
    pub skipped: Vec<SessionId>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Runs the scanner, then the delta engine for each pending session
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    scanner: SessionScanner,
    engine: DeltaEngine,
    policy: FailurePolicy,
}

impl BatchProcessor {
    pub fn new(store: SessionLogStore, session_match: SessionMatch, policy: FailurePolicy) -> Self {
        Self {
            scanner: SessionScanner::new(store.clone(), session_match),
            engine: DeltaEngine::new(store),
            policy,
        }
    }

    /// Process every unprocessed session.
    ///
    /// Only a failing scan is an error; per-session failures land in the report.
    pub fn run(&self) -> Result<BatchReport> {
        let pending = self.scanner.scan()?;
        info!("Found {} unprocessed sessions", pending.len());

        let mut report = BatchReport::default();
        let total = pending.len();
        let mut remaining = pending.into_iter().enumerate();

        while let Some((i, session)) = remaining.next() {
            info!("Processing session {}/{}: {}", i + 1, total, session);
            match self.engine.process_session(&session) {
                Ok(summary) => report.processed.push(summary),
                Err(e) => {
                    error!("Delta processing failed for session {}: {}", session, e);
                    report.failed.push((session, e));
                    if self.policy == FailurePolicy::AbortBatch {
                        report.skipped.extend(remaining.by_ref().map(|(_, s)| s));
                        break;
                    }
                }
            }
        }

        info!(
            "Batch finished: {} processed, {} failed, {} skipped",
            report.processed.len(),
            report.failed.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
