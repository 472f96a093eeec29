//! Real-time frame ingestion: log, then send

use tracing::{debug, trace};

use crate::codec;
use crate::store::{AppendOutcome, SessionLogStore};
use crate::transport::FrameSink;
use crate::triangulation::Triangulator;
use crate::types::{CoordinateFrame, SessionId};
use crate::{PipelineError, Result};

/// What happened to one ingested frame
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub frame: CoordinateFrame,
    pub logged: AppendOutcome,
}

/// Appends frames to one session's log and pushes them to a sink.
///
/// Logging is best-effort and never fails the call; delivery errors are
/// returned to the caller.
pub struct FrameIngestor<S> {
    session: SessionId,
    store: SessionLogStore,
    sink: S,
}

impl<S: FrameSink> FrameIngestor<S> {
    pub fn new(session: SessionId, store: SessionLogStore, sink: S) -> Self {
        Self { session, store, sink }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Log a frame and deliver it.
    pub async fn ingest(&self, frame: CoordinateFrame) -> Result<IngestReport> {
        let logged = self.log_only(&frame);
        self.sink.deliver(&frame).await?;
        trace!("Ingested frame for session {}", self.session);
        Ok(IngestReport { frame, logged })
    }

    /// Parse rendered frame text, then log and deliver it.
    pub async fn ingest_rendered(&self, text: &str) -> Result<IngestReport> {
        let frame = codec::parse(text)?;
        self.ingest(frame).await
    }

    /// Triangulate one stereo pair, then log and deliver the resulting frame.
    pub async fn ingest_stereo<T: Triangulator + ?Sized>(
        &self,
        triangulator: &T,
        left_image: &str,
        right_image: &str,
        left_joints: &str,
        right_joints: &str,
    ) -> Result<IngestReport> {
        let rendered = triangulator
            .triangulate(left_image, right_image, left_joints, right_joints)
            .map_err(|e| match e {
                PipelineError::Collaborator { .. } => e,
                other => PipelineError::Collaborator { reason: other.to_string() },
            })?;
        debug!("Triangulated frame from {} / {}", left_image, right_image);
        self.ingest_rendered(&rendered).await
    }

    /// Append a frame to the session log without sending it.
    pub fn log_only(&self, frame: &CoordinateFrame) -> AppendOutcome {
        self.store.append(&self.session, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::test_utils::{RecordingSink, moving_frames, session};
    use tempfile::TempDir;

    fn ingestor(dir: &TempDir, sink: RecordingSink) -> FrameIngestor<RecordingSink> {
        FrameIngestor::new(
            session("01012024-120000"),
            SessionLogStore::new(LogConfig::under(dir.path())),
            sink,
        )
    }

    #[tokio::test]
    async fn ingest_logs_then_delivers_in_order() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir, RecordingSink::default());
        let frames = moving_frames(3);

        for frame in &frames {
            let report = ingestor.ingest(*frame).await.unwrap();
            assert!(report.logged.is_persisted());
        }

        assert_eq!(ingestor.sink().frames(), frames);
        let logged = ingestor.store.read_frames(ingestor.session()).unwrap();
        let expected: Vec<String> = frames.iter().map(codec::render).collect();
        assert_eq!(logged, expected);
    }

    #[tokio::test]
    async fn sink_failure_surfaces_after_logging() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir, RecordingSink::failing());

        let err = ingestor.ingest(CoordinateFrame::zeroed()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Connection { .. }));
        assert_eq!(ingestor.store.read_frames(ingestor.session()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_text_is_neither_logged_nor_sent() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir, RecordingSink::default());

        let err = ingestor.ingest_rendered("[[[1 2 3]]]").await.unwrap_err();
        assert!(matches!(err, PipelineError::MalformedFrame { .. }));
        assert!(ingestor.sink().frames().is_empty());
        assert!(ingestor.store.read_frames(ingestor.session()).is_err());
    }

    #[tokio::test]
    async fn stereo_ingest_uses_triangulator_output() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir, RecordingSink::default());
        let expected = moving_frames(2)[1];

        let triangulate = |left: &str, right: &str, _: &str, _: &str| -> Result<String> {
            assert_eq!((left, right), ("left_0001.png", "right_0001.png"));
            Ok(codec::render(&expected))
        };

        let report = ingestor
            .ingest_stereo(&triangulate, "left_0001.png", "right_0001.png", "[]", "[]")
            .await
            .unwrap();
        assert_eq!(report.frame, expected);
        assert_eq!(ingestor.sink().frames(), vec![expected]);
    }

    #[tokio::test]
    async fn triangulator_errors_become_collaborator_errors() {
        let dir = TempDir::new().unwrap();
        let ingestor = ingestor(&dir, RecordingSink::default());

        let failing = |_: &str, _: &str, _: &str, _: &str| -> Result<String> {
            Err(PipelineError::malformed_frame("no joints detected"))
        };

        let err = ingestor.ingest_stereo(&failing, "l", "r", "", "").await.unwrap_err();
        match err {
            PipelineError::Collaborator { reason } => assert!(reason.contains("no joints detected")),
            other => panic!("Expected Collaborator error, got {other:?}"),
        }
    }
}
