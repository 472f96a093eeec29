//! Core types for skeletal coordinate data.
//!
//! ## Architecture
//!
//! - [`JointPoint`] is one `(x, y, z)` joint position, `z` being the depth estimate
//! - [`CoordinateFrame`] holds exactly [`JOINT_COUNT`] joints in BODY_25 order
//! - [`Joint`] names the BODY_25 indices for readable access
//! - [`SessionId`] identifies one tracking run (`<date>-<time>`)
//! - [`DeltaRecord`] is the per-joint movement between two adjacent frames
//! - [`ReplayRate`] controls pacing when a logged session is re-sent
//!
//! ## Usage Example
//!
//! ```rust
//! use posetrail::types::{CoordinateFrame, DeltaRecord, Joint, JointPoint};
//!
//! let older = CoordinateFrame::zeroed();
//! let newer = older.with_joint(Joint::RElbow, JointPoint::new(-1.0, 2.0, -0.5));
//!
//! let record = DeltaRecord::between(1, &older, &newer);
//! assert_eq!(record.deltas[Joint::RElbow.index()], JointPoint::new(1.0, -2.0, 0.5));
//! assert_eq!(record.frames(), (1, 2));
//! ```

mod delta_record;
mod frame;
mod joint;
mod replay_rate;
mod session;

pub use delta_record::DeltaRecord;
pub use frame::CoordinateFrame;
pub use joint::{JOINT_COUNT, Joint, JointPoint};
pub use replay_rate::ReplayRate;
pub use session::SessionId;
