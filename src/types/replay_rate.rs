//! Pacing control for session replay

use serde::{Deserialize, Serialize};
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Rate at which a logged session is re-sent to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ReplayRate {
    /// Send frames back to back
    #[default]
    Unpaced,

    /// At most this many frames per second
    /// Zero is treated as unpaced
    Hz(u32),
}

impl ReplayRate {
    /// Interval between frames, if pacing applies
    ///
    /// Never zero: rates above 1 GHz are clamped to a 1ns period.
    pub fn interval(self) -> Option<Duration> {
        match self {
            ReplayRate::Unpaced | ReplayRate::Hz(0) => None,
            ReplayRate::Hz(hz) => Some(Duration::from_nanos((NANOS_PER_SEC / u64::from(hz)).max(1))),
        }
    }
}
