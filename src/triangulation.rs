//! Boundary to the stereo triangulation stage
//!
//! Calibration, rectification and depth estimation live outside this crate.
//! The pipeline only needs a function from one stereo pair and its two 2D joint
//! sets to one rendered 3D frame.

use crate::Result;

/// Produces the 3D joints for one instant from a rectified stereo pair.
pub trait Triangulator {
    /// Returns one frame rendered in the coordinate log format.
    ///
    /// `left_joints` and `right_joints` are the 2D joint sets detected in each
    /// image, as emitted by the pose estimator.
    fn triangulate(
        &self,
        left_image: &str,
        right_image: &str,
        left_joints: &str,
        right_joints: &str,
    ) -> Result<String>;
}

impl<F> Triangulator for F
where
    F: Fn(&str, &str, &str, &str) -> Result<String>,
{
    fn triangulate(
        &self,
        left_image: &str,
        right_image: &str,
        left_joints: &str,
        right_joints: &str,
    ) -> Result<String> {
        self(left_image, right_image, left_joints, right_joints)
    }
}
