//! Joint point and skeletal layout types

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Number of joints in one frame (BODY_25 layout).
pub const JOINT_COUNT: usize = 25;

/// One joint position. `z` is the depth estimate and is zero for 2D-only data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl JointPoint {
    /// Create a new joint point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A joint at the origin.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Largest absolute component difference against `other`.
    pub fn max_abs_diff(&self, other: &JointPoint) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs()).max((self.z - other.z).abs())
    }
}

impl Sub for JointPoint {
    type Output = JointPoint;

    fn sub(self, rhs: JointPoint) -> JointPoint {
        JointPoint::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[f64; 3]> for JointPoint {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// BODY_25 joint layout. The discriminant is the joint's index within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    Nose = 0,
    Neck = 1,
    RShoulder = 2,
    RElbow = 3,
    RWrist = 4,
    LShoulder = 5,
    LElbow = 6,
    LWrist = 7,
    MidHip = 8,
    RHip = 9,
    RKnee = 10,
    RAnkle = 11,
    LHip = 12,
    LKnee = 13,
    LAnkle = 14,
    REye = 15,
    LEye = 16,
    REar = 17,
    LEar = 18,
    LBigToe = 19,
    LSmallToe = 20,
    LHeel = 21,
    RBigToe = 22,
    RSmallToe = 23,
    RHeel = 24,
}

impl Joint {
    /// All joints in index order.
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::Neck,
        Joint::RShoulder,
        Joint::RElbow,
        Joint::RWrist,
        Joint::LShoulder,
        Joint::LElbow,
        Joint::LWrist,
        Joint::MidHip,
        Joint::RHip,
        Joint::RKnee,
        Joint::RAnkle,
        Joint::LHip,
        Joint::LKnee,
        Joint::LAnkle,
        Joint::REye,
        Joint::LEye,
        Joint::REar,
        Joint::LEar,
        Joint::LBigToe,
        Joint::LSmallToe,
        Joint::LHeel,
        Joint::RBigToe,
        Joint::RSmallToe,
        Joint::RHeel,
    ];

    /// Position of this joint within a frame.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a joint by frame index.
    pub fn from_index(index: usize) -> Option<Joint> {
        Self::ALL.get(index).copied()
    }

    /// Layout name as used by the pose estimator.
    pub fn name(self) -> &'static str {
        match self {
            Joint::Nose => "Nose",
            Joint::Neck => "Neck",
            Joint::RShoulder => "RShoulder",
            Joint::RElbow => "RElbow",
            Joint::RWrist => "RWrist",
            Joint::LShoulder => "LShoulder",
            Joint::LElbow => "LElbow",
            Joint::LWrist => "LWrist",
            Joint::MidHip => "MidHip",
            Joint::RHip => "RHip",
            Joint::RKnee => "RKnee",
            Joint::RAnkle => "RAnkle",
            Joint::LHip => "LHip",
            Joint::LKnee => "LKnee",
            Joint::LAnkle => "LAnkle",
            Joint::REye => "REye",
            Joint::LEye => "LEye",
            Joint::REar => "REar",
            Joint::LEar => "LEar",
            Joint::LBigToe => "LBigToe",
            Joint::LSmallToe => "LSmallToe",
            Joint::LHeel => "LHeel",
            Joint::RBigToe => "RBigToe",
            Joint::RSmallToe => "RSmallToe",
            Joint::RHeel => "RHeel",
        }
    }
}
