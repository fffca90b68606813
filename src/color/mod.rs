//! Scalar attribute to color-ramp mapping.
//!
//! Every scalar point attribute of a frame gets a [`ColorMapping`] holding
//! that frame's value range. Ranges are per frame; the same attribute name
//! in two frames can map the same value to different ramp positions.

mod shading;

pub use shading::*;

use serde::Serialize;
use tracing::warn;

use crate::geom::{FrameMesh, PointAttribute};

/// Ramp position used for every value of a constant attribute.
pub const DEGENERATE_MIDPOINT: f32 = 0.5;

/// Observed value range of one scalar attribute in one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColorMapping {
    pub attribute: String,
    pub min: f32,
    pub max: f32,
}

impl ColorMapping {
    /// Range from explicit bounds. Swapped bounds are reordered.
    pub fn new(attribute: impl Into<String>, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            attribute: attribute.into(),
            min,
            max,
        }
    }

    /// Range of a scalar attribute. `None` for vector attributes.
    ///
    /// NaN and infinite values are ignored; an attribute with no finite values gets the
    /// degenerate range `[0, 0]`.
    pub fn from_attribute(attr: &PointAttribute) -> Option<Self> {
        if !attr.is_scalar() {
            return None;
        }
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in attr.values.iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            warn!(attribute = %attr.name, "no finite values, using degenerate color range");
            return Some(Self::new(attr.name.clone(), 0.0, 0.0));
        }
        Some(Self::new(attr.name.clone(), min, max))
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Map a value to `[0, 1]`, clamped. Constant ranges give the midpoint.
    pub fn normalize(&self, value: f32) -> f32 {
        if self.is_degenerate() {
            return DEGENERATE_MIDPOINT;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Source domain for a host's linear map-range node.
    ///
    /// A degenerate range is widened symmetrically, so the constant value
    /// still lands on the midpoint instead of dividing by zero.
    pub fn map_range_domain(&self) -> (f32, f32) {
        if self.is_degenerate() {
            let pad = self.min.abs().max(1.0);
            (self.min - pad, self.max + pad)
        } else {
            (self.min, self.max)
        }
    }
}

/// Mappings for every scalar attribute of a mesh, in attribute order.
pub fn map_attributes(mesh: &FrameMesh) -> Vec<ColorMapping> {
    mesh.scalar_attributes()
        .filter_map(ColorMapping::from_attribute)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Arity;

    #[test]
    fn test_range() {
        let attr = PointAttribute::scalar("p", vec![3.0, -1.0, 7.5, 2.0]);
        let m = ColorMapping::from_attribute(&attr).unwrap();
        assert_eq!((m.min, m.max), (-1.0, 7.5));
        assert!(!m.is_degenerate());
        assert_eq!(m.normalize(-1.0), 0.0);
        assert_eq!(m.normalize(7.5), 1.0);
        assert!((m.normalize(3.25) - 0.5).abs() < 1e-6);
        // Out-of-range values are clamped.
        assert_eq!(m.normalize(100.0), 1.0);
    }

    #[test]
    fn test_degenerate_range() {
        let attr = PointAttribute::scalar("c", vec![7.0; 5]);
        let m = ColorMapping::from_attribute(&attr).unwrap();
        assert!(m.is_degenerate());
        for v in [7.0, 0.0, -3.0] {
            let n = m.normalize(v);
            assert!(!n.is_nan());
            assert_eq!(n, DEGENERATE_MIDPOINT);
        }
        let (lo, hi) = m.map_range_domain();
        assert!(lo < hi);
        assert_eq!((7.0 - lo) / (hi - lo), 0.5);
    }

    #[test]
    fn test_nan_values() {
        let attr = PointAttribute::scalar("n", vec![f32::NAN, 2.0, f32::NAN, 4.0]);
        let m = ColorMapping::from_attribute(&attr).unwrap();
        assert_eq!((m.min, m.max), (2.0, 4.0));

        let attr = PointAttribute::scalar("all_nan", vec![f32::NAN; 3]);
        let m = ColorMapping::from_attribute(&attr).unwrap();
        assert_eq!((m.min, m.max), (0.0, 0.0));
    }

    #[test]
    fn test_infinite_values() {
        let attr = PointAttribute::scalar("t", vec![1.0, 2.0, f32::INFINITY, 1.5]);
        let m = ColorMapping::from_attribute(&attr).unwrap();
        assert_eq!((m.min, m.max), (1.0, 2.0));

        let attr = PointAttribute::scalar("t", vec![f32::NEG_INFINITY, -3.0, f32::NAN, 0.5]);
        let m = ColorMapping::from_attribute(&attr).unwrap();
        assert_eq!((m.min, m.max), (-3.0, 0.5));

        let attr = PointAttribute::scalar("inf", vec![f32::INFINITY, f32::NEG_INFINITY]);
        let m = ColorMapping::from_attribute(&attr).unwrap();
        assert!(m.is_degenerate());
        assert_eq!((m.min, m.max), (0.0, 0.0));
    }

    #[test]
    fn test_vectors_not_mapped() {
        let attr = PointAttribute::new("v", Arity::Vector(3), vec![0.0; 6]);
        assert!(ColorMapping::from_attribute(&attr).is_none());
    }

    #[test]
    fn test_map_attributes_per_mesh() {
        let mesh = FrameMesh {
            frame: 1,
            attributes: vec![
                PointAttribute::scalar("a", vec![1.0, 2.0]),
                PointAttribute::new("v", Arity::Vector(2), vec![0.0; 4]),
                PointAttribute::scalar("b", vec![5.0, 5.0]),
            ],
            ..Default::default()
        };
        let maps = map_attributes(&mesh);
        let names: Vec<_> = maps.iter().map(|m| m.attribute.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(maps[1].is_degenerate());
    }

    #[test]
    fn test_swapped_bounds() {
        let m = ColorMapping::new("x", 4.0, 1.0);
        assert_eq!((m.min, m.max), (1.0, 4.0));
    }
}
