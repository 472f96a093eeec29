//! Coordinate frame type

use super::{JOINT_COUNT, Joint, JointPoint};
use crate::{PipelineError, Result};

/// One instant's full set of skeletal joint coordinates.
///
/// The joint count is fixed by the type; index `i` is always joint `i` of the
/// BODY_25 layout, and that order is kept through logging, parsing and transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    joints: [JointPoint; JOINT_COUNT],
}

impl CoordinateFrame {
    /// Create a frame from a full joint array
    pub fn new(joints: [JointPoint; JOINT_COUNT]) -> Self {
        Self { joints }
    }

    /// A frame with every joint at the origin
    pub fn zeroed() -> Self {
        Self { joints: [JointPoint::zero(); JOINT_COUNT] }
    }

    /// Build a frame from an arbitrary joint list, rejecting the wrong count
    pub fn from_points(points: Vec<JointPoint>) -> Result<Self> {
        let found = points.len();
        let joints: [JointPoint; JOINT_COUNT] = points.try_into().map_err(|_| {
            PipelineError::malformed_frame(format!(
                "expected {JOINT_COUNT} joints, found {found}"
            ))
        })?;
        Ok(Self { joints })
    }

    /// All joints in index order
    pub fn joints(&self) -> &[JointPoint; JOINT_COUNT] {
        &self.joints
    }

    /// Joint at `index`, if within the layout
    pub fn get(&self, index: usize) -> Option<&JointPoint> {
        self.joints.get(index)
    }

    /// Named joint access
    pub fn joint(&self, joint: Joint) -> &JointPoint {
        &self.joints[joint.index()]
    }

    /// Copy of this frame with one joint replaced
    pub fn with_joint(mut self, joint: Joint, point: JointPoint) -> Self {
        self.joints[joint.index()] = point;
        self
    }

    /// True when every joint is within `tolerance` of the other frame's joint
    pub fn approx_eq(&self, other: &CoordinateFrame, tolerance: f64) -> bool {
        self.joints.iter().zip(other.joints.iter()).all(|(a, b)| a.max_abs_diff(b) <= tolerance)
    }
}

impl Default for CoordinateFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}
