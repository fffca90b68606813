//! Visibility state and keyframes.

use serde::Serialize;

/// Visibility of a frame mesh at a timeline position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    /// Check if this is visible.
    #[inline]
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Value for host "hide" channels (`true` = hidden).
    #[inline]
    pub fn hide_flag(self) -> bool {
        !self.is_visible()
    }
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible {
            Self::Visible
        } else {
            Self::Hidden
        }
    }
}

/// Keyframe interpolation. Visibility only ever steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Interpolation {
    #[default]
    Constant,
}

/// Host channels that receive the same visibility keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum VisibilityTrack {
    Render,
    Viewport,
}

impl VisibilityTrack {
    pub const ALL: [Self; 2] = [Self::Render, Self::Viewport];

    /// Host data path of the channel.
    pub fn data_path(self) -> &'static str {
        match self {
            Self::Render => "hide_render",
            Self::Viewport => "hide_viewport",
        }
    }
}

/// One key on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Keyframe {
    /// Timeline position (1-based frame).
    pub position: u32,
    pub visibility: Visibility,
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn constant(position: u32, visibility: Visibility) -> Self {
        Self {
            position,
            visibility,
            interpolation: Interpolation::Constant,
        }
    }
}
