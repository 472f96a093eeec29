//! Text codec for logged coordinate frames
//!
//! One frame is one line of the form
//!
//! ```text
//! [[[x0 y0 z0][x1 y1 z1]...[x24 y24 z24]]]
//! ```
//!
//! Each joint is bracketed; the whole frame carries two extra opening brackets
//! and two extra closing brackets. Fields inside a joint are separated by any
//! run of whitespace, so the padded output of array printers parses as well.
//!
//! ```rust
//! use posetrail::codec;
//! use posetrail::types::CoordinateFrame;
//!
//! let frame = CoordinateFrame::zeroed();
//! let line = codec::render(&frame);
//! assert!(line.starts_with("[[[0 0 0][0 0 0]"));
//! assert_eq!(codec::parse(&line).unwrap(), frame);
//! ```

use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::types::{CoordinateFrame, JOINT_COUNT, JointPoint};
use crate::{PipelineError, Result};

const FRAME_PREFIX: &str = "[[[";
const FRAME_SUFFIX: &str = "]]]";
const JOINT_SEPARATOR: &str = "][";

/// Render a frame to its single-line text form (no trailing newline).
pub fn render(frame: &CoordinateFrame) -> String {
    let mut out = String::with_capacity(JOINT_COUNT * 24);
    out.push_str("[[");
    for joint in frame.joints() {
        // writing to a String cannot fail
        let _ = write!(out, "[{} {} {}]", joint.x, joint.y, joint.z);
    }
    out.push_str("]]");
    out
}

/// Strip the frame wrapper and split a line into per-joint field strings.
///
/// A single trailing `\n` or `\r\n` is ignored, so lines read with or without
/// their terminator behave the same.
pub fn split_joints(line: &str) -> Result<Vec<&str>> {
    let body = line.strip_suffix('\n').unwrap_or(line);
    let body = body.strip_suffix('\r').unwrap_or(body);

    let inner = body
        .strip_prefix(FRAME_PREFIX)
        .and_then(|rest| rest.strip_suffix(FRAME_SUFFIX))
        .ok_or_else(|| {
            PipelineError::malformed_frame(format!(
                "line is not wrapped in '{FRAME_PREFIX}' ... '{FRAME_SUFFIX}'"
            ))
        })?;

    Ok(inner.split(JOINT_SEPARATOR).collect())
}

/// Parse the fields of one joint (`"x y z"`).
pub fn parse_joint(index: usize, fields: &str) -> Result<JointPoint> {
    let values: Vec<&str> = fields.split_whitespace().collect();
    if values.len() != 3 {
        return Err(PipelineError::malformed_frame(format!(
            "joint {index}: expected 3 fields, found {}",
            values.len()
        )));
    }

    let mut xyz = [0.0f64; 3];
    for (slot, value) in xyz.iter_mut().zip(&values) {
        *slot = value.parse::<f64>().map_err(|e| {
            PipelineError::malformed_frame(format!("joint {index}: '{value}' is not a number ({e})"))
        })?;
    }

    Ok(JointPoint::from(xyz))
}

/// Parse one logged line into a frame.
pub fn parse(line: &str) -> Result<CoordinateFrame> {
    let joints = split_joints(line)?;
    let points =
        joints.iter().enumerate().map(|(i, f)| parse_joint(i, f)).collect::<Result<Vec<_>>>()?;
    CoordinateFrame::from_points(points)
}

impl fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

impl FromStr for CoordinateFrame {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Joint;
    use proptest::prelude::*;

    fn counting_frame() -> CoordinateFrame {
        let points = (0..JOINT_COUNT)
            .map(|i| JointPoint::new(i as f64, -(i as f64) * 0.5, i as f64 * 10.25))
            .collect();
        CoordinateFrame::from_points(points).unwrap()
    }

    proptest! {
        #[test]
        fn prop_render_then_parse_preserves_frame(
            coords in prop::collection::vec(
                (-1e6f64..1e6, -1e6f64..1e6, -1e6f64..1e6),
                JOINT_COUNT
            )
        ) {
            let points = coords.into_iter().map(|(x, y, z)| JointPoint::new(x, y, z)).collect();
            let frame = CoordinateFrame::from_points(points).unwrap();

            let parsed = parse(&render(&frame)).unwrap();
            prop_assert!(parsed.approx_eq(&frame, 1e-6));
        }

        #[test]
        fn prop_garbage_never_panics(line in ".*") {
            let _ = parse(&line);
        }
    }

    #[test]
    fn render_layout_matches_log_format() {
        let frame = CoordinateFrame::zeroed().with_joint(Joint::Nose, JointPoint::new(1.5, -2.0, 0.25));
        let line = render(&frame);

        assert!(line.starts_with("[[[1.5 -2 0.25][0 0 0]"));
        assert!(line.ends_with("[0 0 0]]]"));
        assert!(!line.contains('\n'));
        assert_eq!(line.matches(JOINT_SEPARATOR).count(), JOINT_COUNT - 1);
    }

    #[test]
    fn split_joints_handles_line_terminators() {
        let line = render(&counting_frame());
        let bare = split_joints(&line).unwrap();
        let lf = format!("{line}\n");
        let crlf = format!("{line}\r\n");

        assert_eq!(bare.len(), JOINT_COUNT);
        assert_eq!(split_joints(&lf).unwrap(), bare);
        assert_eq!(split_joints(&crlf).unwrap(), bare);
        assert_eq!(bare[2], "2 -1 20.5");
    }

    #[test]
    fn parse_accepts_padded_fields() {
        let joint = "  1.0    2.5\t-3.0 ";
        let line = format!("[[[{}]]]", vec![joint; JOINT_COUNT].join(JOINT_SEPARATOR));
        let frame = parse(&line).unwrap();
        assert_eq!(*frame.joint(Joint::RHeel), JointPoint::new(1.0, 2.5, -3.0));
    }

    #[test]
    fn parse_rejects_missing_wrapper() {
        let err = parse("[[0 0 0][0 0 0]]").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedFrame { line: None, .. }));
    }

    #[test]
    fn parse_rejects_wrong_field_count() {
        let mut joints = vec!["0 0 0"; JOINT_COUNT];
        joints[4] = "0 0";
        let line = format!("[[[{}]]]", joints.join(JOINT_SEPARATOR));

        let err = parse(&line).unwrap_err();
        assert!(err.to_string().contains("joint 4: expected 3 fields, found 2"));
    }

    #[test]
    fn parse_rejects_non_numeric_field() {
        let mut joints = vec!["0 0 0"; JOINT_COUNT];
        joints[0] = "0 abc 0";
        let line = format!("[[[{}]]]", joints.join(JOINT_SEPARATOR));

        let err = parse(&line).unwrap_err();
        assert!(err.to_string().contains("'abc' is not a number"));
    }

    #[test]
    fn parse_rejects_wrong_joint_count() {
        let line = format!("[[[{}]]]", vec!["0 0 0"; 3].join(JOINT_SEPARATOR));
        let err = parse(&line).unwrap_err();
        assert!(err.to_string().contains("expected 25 joints, found 3"));
    }

    #[test]
    fn display_and_from_str_agree_with_codec() {
        let frame = counting_frame();
        let text = frame.to_string();
        assert_eq!(text, render(&frame));
        assert_eq!(text.parse::<CoordinateFrame>().unwrap(), frame);
    }
}
