//! Per-pair joint delta records

use super::{CoordinateFrame, JOINT_COUNT, JointPoint};

/// Joint deltas for one pair of temporally adjacent frames.
///
/// `pair` is the 1-based number of the older frame, so the record covers
/// frames `(pair, pair + 1)`. Each delta is `older - newer`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRecord {
    pub pair: usize,
    pub deltas: [JointPoint; JOINT_COUNT],
}

impl DeltaRecord {
    /// Compute the record for `older` followed by `newer`.
    pub fn between(pair: usize, older: &CoordinateFrame, newer: &CoordinateFrame) -> Self {
        let mut deltas = [JointPoint::zero(); JOINT_COUNT];
        for (slot, (a, b)) in deltas.iter_mut().zip(older.joints().iter().zip(newer.joints())) {
            *slot = *a - *b;
        }
        Self { pair, deltas }
    }

    /// Frame numbers (1-based) this record covers.
    pub fn frames(&self) -> (usize, usize) {
        (self.pair, self.pair + 1)
    }

    /// True when no joint moved.
    pub fn is_still(&self) -> bool {
        self.deltas.iter().all(|d| *d == JointPoint::zero())
    }
}
