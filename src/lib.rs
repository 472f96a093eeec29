//! Session logging, inter-frame delta analysis and frame transport for 3D
//! skeletal joint coordinates.
//!
//! Posetrail sits behind a stereo pose-estimation stage. Each triangulated
//! frame of 25 BODY_25 joints is appended to a per-session coordinate log and
//! pushed to a remote consumer over TCP. Later, an offline batch pass turns
//! every unprocessed coordinate log into a human-readable report of how far
//! each joint moved between consecutive frames.
//!
//! # Features
//!
//! - **Codec**: the `[[[x y z][x y z]...]]` frame text format
//! - **Session logs**: append-only coordinate logs keyed by `<date>-<time>`
//! - **Delta reports**: per-joint displacement between adjacent frames
//! - **Transport**: one base64-framed message per TCP connection
//! - **Replay**: re-send a logged session, optionally paced
//!
//! # Example
//!
//! ```rust,no_run
//! use posetrail::{PipelineConfig, PoseTrail, SessionId};
//! use posetrail::types::CoordinateFrame;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> posetrail::Result<()> {
//!     let trail = PoseTrail::new(PipelineConfig::load("posetrail.yaml")?)?;
//!
//!     let ingestor = trail.ingestor(SessionId::now());
//!     ingestor.ingest(CoordinateFrame::zeroed()).await?;
//!
//!     let report = trail.process_pending()?;
//!     println!("{} sessions processed", report.processed.len());
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod codec;
pub mod config;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Storage and offline processing
pub mod batch;
pub mod delta;
pub mod scanner;
pub mod store;

// Real-time path
pub mod ingest;
pub mod replay;
pub mod transport;
pub mod triangulation;

// Core exports
pub use config::PipelineConfig;
pub use error::*;
pub use types::*;

// Main API exports
pub use batch::{BatchProcessor, BatchReport};
pub use delta::{DeltaEngine, DeltaSummary};
pub use ingest::{FrameIngestor, IngestReport};
pub use replay::SessionReplay;
pub use store::{AppendOutcome, SessionLogStore};
pub use transport::{FrameSender, FrameSink};
pub use triangulation::Triangulator;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Unified entry point wiring every component from one [`PipelineConfig`].
///
/// # Examples
///
/// ```rust,no_run
/// use posetrail::{PipelineConfig, PoseTrail, ReplayRate, SessionId};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> posetrail::Result<()> {
/// let trail = PoseTrail::new(PipelineConfig::default())?;
/// let session = SessionId::parse("01012024-120000")?;
/// let sent = trail.replay(&session, ReplayRate::Hz(30), &CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PoseTrail {
    config: PipelineConfig,
    store: SessionLogStore,
    sender: FrameSender,
}

impl PoseTrail {
    /// Validate `config` and build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is inconsistent.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "Pipeline logs at {} / {}, consumer at {}",
            config.logs.coordinate_dir.display(),
            config.logs.delta_dir.display(),
            config.transport.address()
        );
        let store = SessionLogStore::new(config.logs.clone());
        let sender = FrameSender::new(config.transport.clone());
        Ok(Self { config, store, sender })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionLogStore {
        &self.store
    }

    pub fn sender(&self) -> &FrameSender {
        &self.sender
    }

    /// Real-time ingestor for one session, sending to the configured consumer.
    pub fn ingestor(&self, session: SessionId) -> FrameIngestor<FrameSender> {
        FrameIngestor::new(session, self.store.clone(), self.sender.clone())
    }

    pub fn batch_processor(&self) -> BatchProcessor {
        let processing = &self.config.processing;
        BatchProcessor::new(self.store.clone(), processing.session_match, processing.failure_policy)
    }

    /// Generate delta reports for every session that lacks one.
    pub fn process_pending(&self) -> Result<BatchReport> {
        self.batch_processor().run()
    }

    /// Re-send a logged session to the configured consumer.
    pub async fn replay(&self, session: &SessionId, rate: ReplayRate, cancel: &CancellationToken) -> Result<usize> {
        SessionReplay::open(&self.store, session)?.run(&self.sender, rate, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogConfig, TransportConfig};
    use crate::test_utils::{FrameListener, moving_frames, session, write_coordinate_log};
    use tempfile::TempDir;

    fn config_under(dir: &TempDir, port: u16) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.logs = LogConfig::under(dir.path());
        config.transport = TransportConfig::endpoint("127.0.0.1", port);
        config
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.transport.host.clear();
        assert!(matches!(PoseTrail::new(config), Err(PipelineError::Config { .. })));
    }

    #[test]
    fn process_pending_covers_logged_sessions() {
        let dir = TempDir::new().unwrap();
        let trail = PoseTrail::new(config_under(&dir, 8080)).unwrap();
        let id = session("01012024-120000");
        write_coordinate_log(trail.store(), &id, &moving_frames(3));

        let report = trail.process_pending().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.processed.len(), 1);
        assert_eq!(report.processed[0].records, 2);
        assert!(trail.process_pending().unwrap().processed.is_empty());
    }

    #[tokio::test]
    async fn replay_sends_to_configured_consumer() {
        let dir = TempDir::new().unwrap();
        let listener = FrameListener::bind().await;
        let trail = PoseTrail::new(config_under(&dir, listener.port())).unwrap();
        let id = session("01012024-120000");
        let frames = moving_frames(2);
        write_coordinate_log(trail.store(), &id, &frames);

        let receive = tokio::spawn(async move {
            let mut frames = Vec::new();
            for _ in 0..2 {
                let wire = listener.receive_one().await;
                frames.push(transport::TransportMessage::decode(&wire).unwrap().frame().unwrap());
            }
            frames
        });

        let sent = trail.replay(&id, ReplayRate::Unpaced, &CancellationToken::new()).await.unwrap();
        assert_eq!(sent, 2);
        assert_eq!(receive.await.unwrap(), frames);
    }
}
