//! One-message-per-connection frame sender

use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::message::TransportMessage;
use crate::config::TransportConfig;
use crate::types::CoordinateFrame;
use crate::{PipelineError, Result};

/// Lifecycle of a single send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Connecting,
    Connected,
    Sending,
    Draining,
    Closed,
}

/// Result of a completed send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    /// Encoded bytes written to the socket
    pub bytes_written: usize,
    /// Unencoded payload length carried in the length segment
    pub payload_len: u32,
}

/// Destination for frames on the real-time path
#[async_trait::async_trait]
pub trait FrameSink: Send + Sync {
    /// Deliver one frame; errors surface to the caller unchanged.
    async fn deliver(&self, frame: &CoordinateFrame) -> Result<()>;
}

/// Sends each frame over its own TCP connection.
///
/// Every send opens a connection, writes one message, flushes, half-closes and
/// drops the socket. Nothing is read back. The whole sequence is bounded by the
/// configured send timeout and can be cancelled through a [`CancellationToken`].
#[derive(Debug, Clone)]
pub struct FrameSender {
    config: TransportConfig,
}

impl FrameSender {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send one frame.
    pub async fn send_frame(&self, frame: &CoordinateFrame, cancel: &CancellationToken) -> Result<SendReceipt> {
        self.send(&TransportMessage::from_frame(frame), cancel).await
    }

    /// Send one message, honoring the send timeout and `cancel`.
    pub async fn send(&self, message: &TransportMessage, cancel: &CancellationToken) -> Result<SendReceipt> {
        let wire = message.encode()?;
        let payload_len = message.length()?;
        let deadline = self.config.send_timeout();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Send to {} cancelled", self.config.address());
                Err(PipelineError::Cancelled)
            }
            result = tokio::time::timeout(deadline, self.deliver_once(&wire)) => match result {
                Ok(Ok(bytes_written)) => Ok(SendReceipt { bytes_written, payload_len }),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(PipelineError::Timeout { duration: deadline }),
            },
        }
    }

    /// Send one frame from synchronous code.
    ///
    /// Runs the send on a dedicated current-thread runtime and blocks until it
    /// completes. Returns [`PipelineError::NestedRuntime`] when called from a
    /// thread that is already driving a tokio runtime.
    pub fn send_blocking(&self, frame: &CoordinateFrame) -> Result<SendReceipt> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(PipelineError::NestedRuntime);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PipelineError::connection_failed_with_source("failed to start send runtime", Box::new(e)))?;

        let cancel = CancellationToken::new();
        runtime.block_on(self.send_frame(frame, &cancel))
    }

    async fn deliver_once(&self, wire: &[u8]) -> Result<usize> {
        let address = self.config.address();
        let mut state = SendState::Idle;
        transition(&mut state, SendState::Connecting, &address);

        let mut stream = self.connect(&address).await?;
        transition(&mut state, SendState::Connected, &address);

        transition(&mut state, SendState::Sending, &address);
        stream.write_all(wire).await.map_err(|e| write_failed(&address, e))?;

        transition(&mut state, SendState::Draining, &address);
        stream.flush().await.map_err(|e| write_failed(&address, e))?;
        stream.shutdown().await.map_err(|e| write_failed(&address, e))?;

        drop(stream);
        transition(&mut state, SendState::Closed, &address);
        debug!("Sent {} bytes to {}", wire.len(), address);
        Ok(wire.len())
    }

    async fn connect(&self, address: &str) -> Result<TcpStream> {
        let connect_timeout: Duration = self.config.connect_timeout();
        let host = self.config.host.as_str();
        let port = self.config.port;

        match tokio::time::timeout(connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(PipelineError::connection_failed_with_source(
                format!("cannot connect to {address}"),
                Box::new(e),
            )),
            Err(_) => Err(PipelineError::Timeout { duration: connect_timeout }),
        }
    }
}

#[async_trait::async_trait]
impl FrameSink for FrameSender {
    async fn deliver(&self, frame: &CoordinateFrame) -> Result<()> {
        self.send_frame(frame, &CancellationToken::new()).await.map(|_| ())
    }
}

fn transition(state: &mut SendState, next: SendState, address: &str) {
    trace!("Send to {}: {:?} -> {:?}", address, state, next);
    *state = next;
}

fn write_failed(address: &str, e: std::io::Error) -> PipelineError {
    PipelineError::connection_failed_with_source(format!("write to {address} failed"), Box::new(e))
}
