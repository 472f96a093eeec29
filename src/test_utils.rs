//! Test utilities shared by unit tests, integration tests and benches
//!
//! Fixtures are generated rather than read from disk so every test controls its
//! own log directory.

#![cfg(any(test, feature = "benchmark"))]

use std::sync::Mutex;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use crate::store::SessionLogStore;
use crate::transport::FrameSink;
use crate::types::{CoordinateFrame, JOINT_COUNT, JointPoint, SessionId};
use crate::{PipelineError, Result};

/// Parse a session id, panicking on invalid input.
pub fn session(id: &str) -> SessionId {
    SessionId::parse(id).unwrap_or_else(|e| panic!("invalid test session id {id:?}: {e}"))
}

/// `count` pairwise-distinct frames describing a skeleton drifting through space.
///
/// Coordinates are chosen so that every joint moves between consecutive frames
/// and the rendered text parses back to identical values.
pub fn moving_frames(count: usize) -> Vec<CoordinateFrame> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let mut joints = [JointPoint::zero(); JOINT_COUNT];
            for (j, point) in joints.iter_mut().enumerate() {
                let k = j as f64;
                *point = JointPoint::new(t * 1.5 + k, t * 0.25 - k, k * 0.125 + t * 2.0);
            }
            CoordinateFrame::new(joints)
        })
        .collect()
}

/// Append `frames` to the session's coordinate log.
pub fn write_coordinate_log(store: &SessionLogStore, session: &SessionId, frames: &[CoordinateFrame]) {
    for frame in frames {
        let outcome = store.append(session, frame);
        assert!(outcome.is_persisted(), "fixture append failed: {outcome:?}");
    }
}

/// A [`FrameSink`] that records delivered frames in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<CoordinateFrame>>,
    fail: bool,
}

impl RecordingSink {
    /// A sink whose deliveries always fail with a connection error.
    pub fn failing() -> Self {
        Self { frames: Mutex::default(), fail: true }
    }

    pub fn frames(&self) -> Vec<CoordinateFrame> {
        self.frames.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl FrameSink for RecordingSink {
    async fn deliver(&self, frame: &CoordinateFrame) -> Result<()> {
        if self.fail {
            return Err(PipelineError::connection_failed("recording sink is offline"));
        }
        self.frames.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(*frame);
        Ok(())
    }
}

/// Loopback TCP listener standing in for the frame consumer.
pub struct FrameListener {
    listener: TcpListener,
}

impl FrameListener {
    /// Bind to an ephemeral port on 127.0.0.1.
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback listener");
        Self { listener }
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().expect("listener address").port()
    }

    /// Accept one connection and read until the peer half-closes.
    pub async fn receive_one(&self) -> Vec<u8> {
        let (mut socket, _) = self.listener.accept().await.expect("accept connection");
        let mut wire = Vec::new();
        socket.read_to_end(&mut wire).await.expect("read message");
        wire
    }
}
