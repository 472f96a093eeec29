//! Re-sending logged sessions to the frame consumer

use futures::{Stream, StreamExt, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::codec;
use crate::store::SessionLogStore;
use crate::transport::FrameSink;
use crate::types::{CoordinateFrame, ReplayRate, SessionId};
use crate::{PipelineError, Result};

const MIN_PERIOD: Duration = Duration::from_nanos(1);

/// Extension trait to add pacing to any Stream
pub trait PaceExt: Stream {
    /// Yield every item, at most one per `period`
    ///
    /// Unlike throttling, nothing is dropped: a burst of ready items is spread
    /// out over consecutive ticks.
    fn paced(self, period: Duration) -> Paced<Self>
    where
        Self: Sized,
    {
        Paced::new(self, period)
    }
}

impl<T: Stream> PaceExt for T {}

pin_project! {
    /// A stream combinator that spaces out emissions
    pub struct Paced<S> {
        #[pin]
        stream: S,
        interval: Interval,
    }
}

impl<S: Stream> Paced<S> {
    /// A zero `period` is raised to 1ns.
    pub fn new(stream: S, period: Duration) -> Self {
        let mut interval = interval(period.max(MIN_PERIOD));
        // fall behind rather than burst
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { stream, interval }
    }
}

impl<S: Stream> Stream for Paced<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        ready!(this.interval.poll_tick(cx));
        // a tick spent on a pending inner stream is not refunded
        this.stream.poll_next(cx)
    }
}

/// Replays one logged session through a [`FrameSink`]
pub struct SessionReplay {
    session: SessionId,
    lines: Vec<String>,
}

impl SessionReplay {
    /// Load a session's coordinate log.
    pub fn open(store: &SessionLogStore, session: &SessionId) -> Result<Self> {
        let lines = store.read_frames(session)?;
        info!("Loaded session {} for replay ({} lines)", session, lines.len());
        Ok(Self { session: session.clone(), lines })
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Parsed frames in log order, skipping blank lines. Parse failures carry
    /// their line number.
    pub fn frames(&self) -> impl Stream<Item = Result<CoordinateFrame>> + '_ {
        futures::stream::iter(
            self.lines
                .iter()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| codec::parse(line).map_err(|e| e.at_line(i + 1))),
        )
    }

    /// Send every frame through `sink` at `rate`.
    ///
    /// Stops at the first malformed line or delivery error, or when `cancel`
    /// fires. Returns the number of frames delivered.
    pub async fn run<S: FrameSink + ?Sized>(
        &self,
        sink: &S,
        rate: ReplayRate,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let mut frames = match rate.interval() {
            Some(period) => self.frames().paced(period).boxed_local(),
            None => self.frames().boxed_local(),
        };

        let mut sent = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Replay of {} cancelled after {} frames", self.session, sent);
                    return Err(PipelineError::Cancelled);
                }
                next = frames.next() => next,
            };

            let Some(frame) = next else { break };
            sink.deliver(&frame?).await?;
            sent += 1;
        }

        info!("Replayed {} frames from session {}", sent, self.session);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::test_utils::{RecordingSink, moving_frames, session, write_coordinate_log};
    use tempfile::TempDir;

    fn seeded(dir: &TempDir, frames: &[CoordinateFrame]) -> (SessionLogStore, SessionId) {
        let store = SessionLogStore::new(LogConfig::under(dir.path()));
        let id = session("01012024-120000");
        write_coordinate_log(&store, &id, frames);
        (store, id)
    }

    #[tokio::test]
    async fn unpaced_replay_delivers_every_frame_in_order() {
        let dir = TempDir::new().unwrap();
        let frames = moving_frames(4);
        let (store, id) = seeded(&dir, &frames);

        let sink = RecordingSink::default();
        let replay = SessionReplay::open(&store, &id).unwrap();
        let sent = replay.run(&sink, ReplayRate::Unpaced, &CancellationToken::new()).await.unwrap();

        assert_eq!(sent, 4);
        assert_eq!(sink.frames(), frames);
    }

    #[tokio::test(start_paused = true)]
    async fn paced_replay_spaces_frames() {
        let dir = TempDir::new().unwrap();
        let (store, id) = seeded(&dir, &moving_frames(3));

        let sink = RecordingSink::default();
        let replay = SessionReplay::open(&store, &id).unwrap();
        let start = tokio::time::Instant::now();
        replay.run(&sink, ReplayRate::Hz(10), &CancellationToken::new()).await.unwrap();

        // first tick is immediate, then two more 100ms periods
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(sink.frames().len(), 3);
    }

    #[tokio::test]
    async fn replay_stops_at_malformed_line() {
        let dir = TempDir::new().unwrap();
        let (store, id) = seeded(&dir, &moving_frames(2));
        store.append_line(&id, "[[[broken]]]");
        write_coordinate_log(&store, &id, &moving_frames(1));

        let sink = RecordingSink::default();
        let replay = SessionReplay::open(&store, &id).unwrap();
        let err = replay.run(&sink, ReplayRate::Unpaced, &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, PipelineError::MalformedFrame { line: Some(3), .. }));
        assert_eq!(sink.frames().len(), 2);
    }

    #[tokio::test]
    async fn cancelled_replay_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let (store, id) = seeded(&dir, &moving_frames(2));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let sink = RecordingSink::default();
        let replay = SessionReplay::open(&store, &id).unwrap();
        let err = replay.run(&sink, ReplayRate::Unpaced, &cancel).await.unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
        assert!(sink.frames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn extreme_rate_replays_without_panicking() {
        let dir = TempDir::new().unwrap();
        let frames = moving_frames(3);
        let (store, id) = seeded(&dir, &frames);

        let sink = RecordingSink::default();
        let replay = SessionReplay::open(&store, &id).unwrap();
        let sent = replay.run(&sink, ReplayRate::Hz(u32::MAX), &CancellationToken::new()).await.unwrap();

        assert_eq!(sent, 3);
        assert_eq!(sink.frames(), frames);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_period_is_clamped() {
        let items: Vec<u32> = futures::stream::iter(0..3).paced(Duration::ZERO).collect().await;
        assert_eq!(items, vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn paced_stream_yields_all_items() {
        let items: Vec<u32> = futures::stream::iter(0..5).paced(Duration::from_millis(50)).collect().await;
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }
}
