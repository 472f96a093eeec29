//! Frame transport to the remote consumer
//!
//! A frame is rendered to text, wrapped in a [`TransportMessage`] and written to
//! a fresh TCP connection by [`FrameSender`]. The consumer treats end-of-stream
//! as the end of one frame.
//!
//! ```rust,no_run
//! use posetrail::config::TransportConfig;
//! use posetrail::transport::FrameSender;
//! use posetrail::types::CoordinateFrame;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> posetrail::Result<()> {
//! let sender = FrameSender::new(TransportConfig::endpoint("192.168.1.20", 8080));
//! let receipt = sender.send_frame(&CoordinateFrame::zeroed(), &CancellationToken::new()).await?;
//! println!("wrote {} bytes", receipt.bytes_written);
//! # Ok(())
//! # }
//! ```

mod message;
mod sender;

pub use message::{FRAME_MESSAGE_TAG, TransportMessage};
pub use sender::{FrameSender, FrameSink, SendReceipt, SendState};
