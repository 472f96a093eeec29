//! Three-segment frame message
//!
//! On the wire a message is the concatenation of three independently
//! base64-encoded segments:
//!
//! | segment | raw bytes | encoded length |
//! |---------|-----------|----------------|
//! | tag     | 1 (`0x01`) | 4 |
//! | length  | 4, big-endian payload byte count | 8 |
//! | payload | UTF-8 frame text | rest |
//!
//! There is no magic number, version or checksum.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::codec;
use crate::types::CoordinateFrame;
use crate::{PipelineError, Result};

/// Tag marking a valid frame payload.
pub const FRAME_MESSAGE_TAG: u8 = 0x01;

const TAG_SEGMENT_LEN: usize = 4;
const LENGTH_SEGMENT_LEN: usize = 8;

/// One frame ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    tag: u8,
    payload: Vec<u8>,
}

impl TransportMessage {
    /// Message carrying an arbitrary payload with the frame tag.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self { tag: FRAME_MESSAGE_TAG, payload: payload.into() }
    }

    /// Message carrying the rendered text of a frame.
    pub fn from_frame(frame: &CoordinateFrame) -> Self {
        Self::new(codec::render(frame))
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Byte length of the unencoded payload as carried in the length segment.
    pub fn length(&self) -> Result<u32> {
        u32::try_from(self.payload.len())
            .map_err(|_| PipelineError::PayloadTooLarge { len: self.payload.len() })
    }

    /// Encode to wire bytes: `b64(tag) || b64(length) || b64(payload)`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let length = self.length()?;
        let mut wire = String::with_capacity(
            TAG_SEGMENT_LEN + LENGTH_SEGMENT_LEN + self.payload.len().div_ceil(3) * 4,
        );
        STANDARD.encode_string([self.tag], &mut wire);
        STANDARD.encode_string(length.to_be_bytes(), &mut wire);
        STANDARD.encode_string(&self.payload, &mut wire);
        Ok(wire.into_bytes())
    }

    /// Decode wire bytes produced by [`encode`](Self::encode).
    pub fn decode(wire: &[u8]) -> Result<Self> {
        if wire.len() < TAG_SEGMENT_LEN + LENGTH_SEGMENT_LEN {
            return Err(PipelineError::malformed_frame(format!(
                "message of {} bytes is shorter than its header",
                wire.len()
            )));
        }

        let (tag_b64, rest) = wire.split_at(TAG_SEGMENT_LEN);
        let (length_b64, payload_b64) = rest.split_at(LENGTH_SEGMENT_LEN);

        let tag = decode_segment("tag", tag_b64)?;
        let [tag] = tag.as_slice() else {
            return Err(PipelineError::malformed_frame("tag segment must hold one byte"));
        };
        if *tag != FRAME_MESSAGE_TAG {
            return Err(PipelineError::malformed_frame(format!("unknown message tag {tag:#04x}")));
        }

        let length = decode_segment("length", length_b64)?;
        let length: [u8; 4] = length
            .try_into()
            .map_err(|_| PipelineError::malformed_frame("length segment must hold four bytes"))?;
        let length = u32::from_be_bytes(length) as usize;

        let payload = decode_segment("payload", payload_b64)?;
        if payload.len() != length {
            return Err(PipelineError::malformed_frame(format!(
                "length segment says {length} bytes, payload has {}",
                payload.len()
            )));
        }

        Ok(Self { tag: *tag, payload })
    }

    /// Parse the payload back into a frame.
    pub fn frame(&self) -> Result<CoordinateFrame> {
        let text = std::str::from_utf8(&self.payload)
            .map_err(|e| PipelineError::malformed_frame(format!("payload is not UTF-8: {e}")))?;
        codec::parse(text)
    }
}

fn decode_segment(name: &str, segment: &[u8]) -> Result<Vec<u8>> {
    STANDARD
        .decode(segment)
        .map_err(|e| PipelineError::malformed_frame(format!("{name} segment is not base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Joint, JointPoint};

    #[test]
    fn hello_payload_segments() {
        let wire = TransportMessage::new("hello").encode().unwrap();
        let text = std::str::from_utf8(&wire).unwrap();

        assert_eq!(&text[..4], "AQ==");
        assert_eq!(STANDARD.decode(&text[..4]).unwrap(), vec![0x01]);

        let length = STANDARD.decode(&text[4..12]).unwrap();
        assert_eq!(u32::from_be_bytes(length.try_into().unwrap()), 5);

        assert_eq!(STANDARD.decode(&text[12..]).unwrap(), b"hello");
        assert_eq!(text, "AQ==AAAABQ==aGVsbG8=");
    }

    #[test]
    fn decode_inverts_encode() {
        let frame = CoordinateFrame::zeroed().with_joint(Joint::LWrist, JointPoint::new(0.5, 1.25, -3.0));
        let message = TransportMessage::from_frame(&frame);

        let decoded = TransportMessage::decode(&message.encode().unwrap()).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.frame().unwrap(), frame);
    }

    #[test]
    fn length_counts_unencoded_utf8_bytes() {
        let message = TransportMessage::new("héllo");
        assert_eq!(message.length().unwrap(), 6);
    }

    #[test]
    fn empty_payload_round_trips() {
        let wire = TransportMessage::new(Vec::new()).encode().unwrap();
        assert_eq!(wire, b"AQ==AAAAAA==");
        assert!(TransportMessage::decode(&wire).unwrap().payload().is_empty());
    }

    #[test]
    fn decode_rejects_bad_messages() {
        // truncated header
        assert!(TransportMessage::decode(b"AQ==AAA").is_err());
        // wrong tag (0x02)
        assert!(TransportMessage::decode(b"Ag==AAAAAA==").is_err());
        // length mismatch: says 5, carries "hi"
        assert!(TransportMessage::decode(b"AQ==AAAABQ==aGk=").is_err());
        // payload not base64
        assert!(TransportMessage::decode(b"AQ==AAAABQ==!!!!").is_err());
    }
}
