//! Math type re-exports and import-space utilities.
//!
//! Re-exports the `glam` types used by the mesh code and provides
//! bounding boxes plus the forward/up axis conversion applied on import.

pub use glam::{Mat3, Vec3};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Error, Result};

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Bounding box of a point set. Empty for no points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut b = Self::EMPTY;
        for &p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

/// Signed coordinate axis, as used by the forward/up import controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "X")]
    X,
    #[serde(rename = "Y")]
    Y,
    #[serde(rename = "Z")]
    Z,
    #[serde(rename = "-X")]
    NegX,
    #[serde(rename = "-Y")]
    NegY,
    #[serde(rename = "-Z")]
    NegZ,
}

impl Axis {
    /// Unit vector for this axis.
    pub fn vector(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
            Self::NegX => Vec3::NEG_X,
            Self::NegY => Vec3::NEG_Y,
            Self::NegZ => Vec3::NEG_Z,
        }
    }

    /// Name as written in settings files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::NegX => "-X",
            Self::NegY => "-Y",
            Self::NegZ => "-Z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Self::X),
            "Y" => Ok(Self::Y),
            "Z" => Ok(Self::Z),
            "-X" | "NEG_X" => Ok(Self::NegX),
            "-Y" | "NEG_Y" => Ok(Self::NegY),
            "-Z" | "NEG_Z" => Ok(Self::NegZ),
            other => Err(format!("unknown axis '{other}' (expected X, Y, Z, -X, -Y or -Z)")),
        }
    }
}

/// Rotation taking source coordinates with the given forward/up axes into
/// the target convention (forward = +Y, up = +Z, right-handed).
///
/// `axis_conversion(Y, Z)` is the identity.
pub fn axis_conversion(forward: Axis, up: Axis) -> Result<Mat3> {
    let f = forward.vector();
    let u = up.vector();
    if f.dot(u).abs() > 0.5 {
        return Err(Error::InvalidAxes {
            forward: forward.to_string(),
            up: up.to_string(),
        });
    }
    let r = f.cross(u);
    // Rows are the source axes; columns of the transpose.
    Ok(Mat3::from_cols(r, f, u).transpose())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox3f() {
        let mut b = BBox3f::EMPTY;
        assert!(b.is_empty());

        b.expand_by_point(Vec3::ZERO);
        assert!(!b.is_empty());
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::ZERO);

        b.expand_by_point(Vec3::ONE);
        assert_eq!(b.center(), Vec3::splat(0.5));
        assert_eq!(b.size(), Vec3::ONE);

        let b = BBox3f::from_points(&[Vec3::new(-1.0, 2.0, 0.0), Vec3::new(1.0, -2.0, 3.0)]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_axis_parse() {
        assert_eq!("y".parse::<Axis>().unwrap(), Axis::Y);
        assert_eq!("-Z".parse::<Axis>().unwrap(), Axis::NegZ);
        assert_eq!("neg_x".parse::<Axis>().unwrap(), Axis::NegX);
        assert!("W".parse::<Axis>().is_err());
    }

    #[test]
    fn test_axis_conversion_identity() {
        let m = axis_conversion(Axis::Y, Axis::Z).unwrap();
        assert!(m.abs_diff_eq(Mat3::IDENTITY, 1e-6));
    }

    #[test]
    fn test_axis_conversion_y_up() {
        // Source is Y-up with -Z forward.
        let m = axis_conversion(Axis::NegZ, Axis::Y).unwrap();
        assert!((m * Vec3::Y).abs_diff_eq(Vec3::Z, 1e-6));
        assert!((m * Vec3::NEG_Z).abs_diff_eq(Vec3::Y, 1e-6));
        assert!((m.determinant() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_axis_conversion_parallel() {
        assert!(matches!(
            axis_conversion(Axis::Z, Axis::NegZ),
            Err(Error::InvalidAxes { .. })
        ));
    }
}
