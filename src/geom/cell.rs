//! Raw cell and point-attribute types as read from a legacy file.

use glam::Vec3;
use serde::Serialize;
use smallvec::SmallVec;

/// VTK cell type tag for triangles.
pub const VTK_TRIANGLE: u32 = 5;
/// VTK cell type tag for generic polygons.
pub const VTK_POLYGON: u32 = 7;
/// VTK cell type tag for quads.
pub const VTK_QUAD: u32 = 9;
/// VTK cell type tag for tetrahedra.
pub const VTK_TETRA: u32 = 10;

/// Point ids of one cell. Most cells have at most 8 points.
pub type CellPoints = SmallVec<[u32; 8]>;

/// Cell kinds the face extractor knows about.
///
/// Every other tag is kept as `Unsupported` so the extractor can drop it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CellType {
    Triangle,
    Quad,
    Tetrahedron,
    Unsupported(u32),
}

impl CellType {
    /// Map a `CELL_TYPES` tag.
    pub fn from_vtk(tag: u32) -> Self {
        match tag {
            VTK_TRIANGLE => Self::Triangle,
            VTK_QUAD => Self::Quad,
            VTK_TETRA => Self::Tetrahedron,
            other => Self::Unsupported(other),
        }
    }

    /// Type of a `POLYGONS` cell, which carries no tag of its own.
    pub fn from_polygon_size(num_points: usize) -> Self {
        match num_points {
            3 => Self::Triangle,
            4 => Self::Quad,
            _ => Self::Unsupported(VTK_POLYGON),
        }
    }

    /// The VTK tag for this type.
    pub fn vtk_tag(self) -> u32 {
        match self {
            Self::Triangle => VTK_TRIANGLE,
            Self::Quad => VTK_QUAD,
            Self::Tetrahedron => VTK_TETRA,
            Self::Unsupported(tag) => tag,
        }
    }

    /// Required point count, if the type has a fixed one.
    pub fn point_count(self) -> Option<usize> {
        match self {
            Self::Triangle => Some(3),
            Self::Quad => Some(4),
            Self::Tetrahedron => Some(4),
            Self::Unsupported(_) => None,
        }
    }

    #[inline]
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

/// One cell: a type tag plus ordered point ids.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub cell_type: CellType,
    pub points: CellPoints,
}

impl Cell {
    pub fn new(cell_type: CellType, points: &[u32]) -> Self {
        Self {
            cell_type,
            points: SmallVec::from_slice(points),
        }
    }
}

/// Geometry of one frame before decomposition.
#[derive(Clone, Debug, Default)]
pub struct RawGeometry {
    /// Point positions, index = point id.
    pub points: Vec<Vec3>,
    /// Cells in file order.
    pub cells: Vec<Cell>,
}

impl RawGeometry {
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// True when there is nothing to decompose.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.cells.is_empty()
    }
}

/// Number of components per point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Arity {
    Scalar,
    Vector(usize),
}

impl Arity {
    /// Arity for a component count; 0 is treated as scalar.
    pub fn from_components(n: usize) -> Self {
        if n <= 1 {
            Self::Scalar
        } else {
            Self::Vector(n)
        }
    }

    pub fn components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector(n) => n,
        }
    }
}

/// Named per-point array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointAttribute {
    pub name: String,
    pub arity: Arity,
    /// Flat tuple data, `num_tuples() * arity.components()` values.
    pub values: Vec<f32>,
}

impl PointAttribute {
    pub fn new(name: impl Into<String>, arity: Arity, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            arity,
            values,
        }
    }

    /// Scalar attribute shorthand.
    pub fn scalar(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self::new(name, Arity::Scalar, values)
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.arity == Arity::Scalar
    }

    pub fn num_tuples(&self) -> usize {
        self.values.len() / self.arity.components()
    }

    /// Components of tuple `i`.
    pub fn tuple(&self, i: usize) -> Option<&[f32]> {
        let n = self.arity.components();
        self.values.get(i * n..(i + 1) * n)
    }
}
