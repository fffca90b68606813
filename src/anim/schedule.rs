//! Per-frame visibility schedules.
//!
//! Frame `f` of `total` gets a Visible key at `f` and Hidden keys at its
//! neighbours `f - 1` and `f + 1` when those lie on the timeline. With
//! constant interpolation this shows exactly one mesh per frame.

use serde::Serialize;
use smallvec::SmallVec;

use super::visibility::{Keyframe, Visibility};
use crate::util::{Error, Result};

/// Timeline bounds, inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineBounds {
    pub start: u32,
    pub end: u32,
}

impl TimelineBounds {
    /// `[1, total]`.
    pub fn for_frames(total: u32) -> Self {
        Self { start: 1, end: total }
    }

    #[inline]
    pub fn contains(&self, position: u32) -> bool {
        (self.start..=self.end).contains(&position)
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_add(1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Visibility keyframes for one frame mesh.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisibilitySchedule {
    pub frame: u32,
    /// Sorted by position, at most three keys.
    pub keyframes: SmallVec<[Keyframe; 3]>,
}

impl VisibilitySchedule {
    /// Schedule for `frame` on a timeline of `total` frames.
    pub fn for_frame(frame: u32, total: u32) -> Result<Self> {
        if frame == 0 || frame > total {
            return Err(Error::InvalidSchedule { frame, total });
        }
        let mut keyframes = SmallVec::new();
        if frame > 1 {
            keyframes.push(Keyframe::constant(frame - 1, Visibility::Hidden));
        }
        keyframes.push(Keyframe::constant(frame, Visibility::Visible));
        if frame < total {
            keyframes.push(Keyframe::constant(frame + 1, Visibility::Hidden));
        }
        Ok(Self { frame, keyframes })
    }

    /// Value at a (possibly fractional) timeline position.
    ///
    /// Holds the last key at or before `position`; before the first key the
    /// first key's value holds.
    pub fn visibility_at(&self, position: f64) -> Visibility {
        let mut current = match self.keyframes.first() {
            Some(k) => k.visibility,
            None => return Visibility::Hidden,
        };
        for key in &self.keyframes {
            if f64::from(key.position) <= position {
                current = key.visibility;
            } else {
                break;
            }
        }
        current
    }

    /// Key positions, ascending.
    pub fn positions(&self) -> impl Iterator<Item = u32> + '_ {
        self.keyframes.iter().map(|k| k.position)
    }
}

/// Schedules for every built frame. Runs once all frames are known.
pub fn schedule_all(frames: &[u32], total: u32) -> Result<Vec<VisibilitySchedule>> {
    frames
        .iter()
        .map(|&f| VisibilitySchedule::for_frame(f, total))
        .collect()
}
