//! Frame visibility animation.
//!
//! Each frame mesh is shown only at its own timeline position. Keys use
//! constant interpolation so no blended state is ever observable.

mod schedule;
mod visibility;

pub use schedule::{schedule_all, TimelineBounds, VisibilitySchedule};
pub use visibility::{Interpolation, Keyframe, Visibility, VisibilityTrack};
