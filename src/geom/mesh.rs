//! Per-frame mesh assembly.
//!
//! [`FrameMeshBuilder`] turns one frame's raw geometry and point attributes
//! into a [`FrameMesh`]: cells are decomposed into faces, the import
//! transform is applied to positions, attributes with a wrong tuple count
//! are rejected, and smooth corner normals are generated on request.

use std::path::{Path, PathBuf};

use glam::{Mat3, Vec3};
use tracing::{debug, warn};

use super::cell::{PointAttribute, RawGeometry};
use super::faces::{extract_faces, Face};
use super::normals::corner_normals;
use crate::util::{axis_conversion, Axis, BBox3f, Error, Result};

/// Scale and axis remap applied to every vertex position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshTransform {
    pub scale: f32,
    pub rotation: Mat3,
}

impl MeshTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation: Mat3::IDENTITY,
    };

    /// Build from the user-facing scale and forward/up controls.
    pub fn new(scale: f32, forward: Axis, up: Axis) -> Result<Self> {
        Ok(Self {
            scale,
            rotation: axis_conversion(forward, up)?,
        })
    }

    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.rotation * p * self.scale
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.rotation == Mat3::IDENTITY
    }
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Mesh object for one frame of the animation.
#[derive(Clone, Debug, Default)]
pub struct FrameMesh {
    /// Timeline position, 1-based.
    pub frame: u32,
    /// Number taken from the source file name, when known.
    pub source_frame: Option<u32>,
    pub source_path: Option<PathBuf>,
    /// Vertex positions after the import transform.
    pub positions: Vec<Vec3>,
    pub faces: Vec<Face>,
    /// Attributes whose tuple count matches the vertex count.
    pub attributes: Vec<PointAttribute>,
    /// Smooth normals per face corner, in face order.
    pub corner_normals: Option<Vec<Vec3>>,
}

impl FrameMesh {
    /// Object name, `Frame_<n>`.
    pub fn name(&self) -> String {
        format!("Frame_{}", self.frame)
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Total number of face corners.
    pub fn num_corners(&self) -> usize {
        self.faces.iter().map(|f| f.len()).sum()
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&PointAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes eligible for color mapping.
    pub fn scalar_attributes(&self) -> impl Iterator<Item = &PointAttribute> {
        self.attributes.iter().filter(|a| a.is_scalar())
    }

    /// Face vertex counts and flattened face vertex indices.
    pub fn face_buffers(&self) -> (Vec<u32>, Vec<u32>) {
        let counts = self.faces.iter().map(|f| f.len() as u32).collect();
        let mut indices = Vec::with_capacity(self.num_corners());
        for face in &self.faces {
            indices.extend_from_slice(face);
        }
        (counts, indices)
    }

    /// Positions as a flat `[x, y, z, x, y, z, ...]` slice.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn bounds(&self) -> BBox3f {
        BBox3f::from_points(&self.positions)
    }
}

/// A built mesh plus the attributes that were turned away.
#[derive(Debug)]
pub struct BuiltMesh {
    pub mesh: FrameMesh,
    /// One `AttributeLengthMismatch` per rejected attribute.
    pub rejected: Vec<Error>,
}

/// Builder for a single [`FrameMesh`].
#[derive(Clone, Debug)]
pub struct FrameMeshBuilder {
    frame: u32,
    source_frame: Option<u32>,
    source_path: Option<PathBuf>,
    transform: MeshTransform,
    smooth_angle: Option<f32>,
}

impl FrameMeshBuilder {
    pub fn new(frame: u32) -> Self {
        Self {
            frame,
            source_frame: None,
            source_path: None,
            transform: MeshTransform::IDENTITY,
            smooth_angle: None,
        }
    }

    /// Record where the frame came from.
    pub fn source(mut self, path: impl AsRef<Path>, source_frame: Option<u32>) -> Self {
        self.source_path = Some(path.as_ref().to_path_buf());
        self.source_frame = source_frame;
        self
    }

    pub fn transform(mut self, transform: MeshTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Generate smooth corner normals with the given angle threshold.
    pub fn smooth_shading(mut self, angle_deg: Option<f32>) -> Self {
        self.smooth_angle = angle_deg;
        self
    }

    /// Assemble the mesh.
    ///
    /// Fails with `EmptyGeometry` when there are no points or no faces
    /// survive decomposition.
    #[tracing::instrument(skip_all, fields(frame = self.frame))]
    pub fn build(self, geometry: RawGeometry, attributes: Vec<PointAttribute>) -> Result<BuiltMesh> {
        let faces = extract_faces(&geometry.cells);
        let num_points = geometry.points.len();
        if num_points == 0 || faces.is_empty() {
            return Err(Error::EmptyGeometry {
                points: num_points,
                faces: faces.len(),
            });
        }

        let mut accepted = Vec::with_capacity(attributes.len());
        let mut rejected = Vec::new();
        for attr in attributes {
            let components = attr.arity.components();
            let tuples = attr.num_tuples();
            if tuples != num_points || attr.values.len() != tuples * components {
                warn!(
                    frame = self.frame,
                    attribute = %attr.name,
                    tuples,
                    expected = num_points,
                    "dropping attribute with mismatched length"
                );
                rejected.push(Error::AttributeLengthMismatch {
                    name: attr.name,
                    expected: num_points,
                    actual: tuples,
                });
                continue;
            }
            accepted.push(attr);
        }

        let positions: Vec<Vec3> = if self.transform.is_identity() {
            geometry.points
        } else {
            geometry.points.into_iter().map(|p| self.transform.apply(p)).collect()
        };

        let corner_normals = self
            .smooth_angle
            .map(|angle| corner_normals(&positions, &faces, angle));

        debug!(
            vertices = positions.len(),
            faces = faces.len(),
            attributes = accepted.len(),
            "built frame mesh"
        );

        Ok(BuiltMesh {
            mesh: FrameMesh {
                frame: self.frame,
                source_frame: self.source_frame,
                source_path: self.source_path,
                positions,
                faces,
                attributes: accepted,
                corner_normals,
            },
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::cell::{Arity, Cell, CellType};

    fn tetra() -> RawGeometry {
        RawGeometry {
            points: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            cells: vec![Cell::new(CellType::Tetrahedron, &[0, 1, 2, 3])],
        }
    }

    #[test]
    fn test_build_tetra() {
        let built = FrameMeshBuilder::new(3)
            .build(tetra(), vec![PointAttribute::scalar("T", vec![1.0, 2.0, 3.0, 4.0])])
            .unwrap();
        let mesh = built.mesh;
        assert_eq!(mesh.name(), "Frame_3");
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_corners(), 12);
        assert!(mesh.attribute("T").is_some());
        assert!(mesh.corner_normals.is_none());
        assert!(built.rejected.is_empty());

        let (counts, indices) = mesh.face_buffers();
        assert_eq!(counts, vec![3, 3, 3, 3]);
        assert_eq!(&indices[..3], &[1, 2, 3]);
        assert_eq!(mesh.positions_flat().len(), 12);
    }

    #[test]
    fn test_mismatched_attribute_rejected() {
        let attrs = vec![
            PointAttribute::scalar("short", vec![1.0, 2.0, 3.0]),
            PointAttribute::new("v", Arity::Vector(3), vec![0.0; 12]),
        ];
        let built = FrameMeshBuilder::new(1).build(tetra(), attrs).unwrap();
        assert_eq!(built.mesh.attributes.len(), 1);
        assert_eq!(built.mesh.attributes[0].name, "v");
        assert_eq!(built.mesh.scalar_attributes().count(), 0);
        assert_eq!(built.rejected.len(), 1);
        assert!(matches!(
            &built.rejected[0],
            Error::AttributeLengthMismatch { name, expected: 4, actual: 3 } if name == "short"
        ));
    }

    #[test]
    fn test_empty_geometry() {
        let mut geom = tetra();
        geom.cells = vec![Cell::new(CellType::Unsupported(12), &[0, 1, 2, 3])];
        let err = FrameMeshBuilder::new(1).build(geom, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyGeometry { points: 4, faces: 0 }));

        let err = FrameMeshBuilder::new(1)
            .build(RawGeometry::default(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyGeometry { points: 0, .. }));
    }

    #[test]
    fn test_transform_and_smoothing() {
        let transform = MeshTransform::new(2.0, Axis::NegZ, Axis::Y).unwrap();
        let built = FrameMeshBuilder::new(1)
            .source("frames/tempfile7.vtk", Some(7))
            .transform(transform)
            .smooth_shading(Some(180.0))
            .build(tetra(), Vec::new())
            .unwrap();
        let mesh = built.mesh;
        // Source +Y is up, so it lands on +Z.
        assert!(mesh.positions[2].abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-6));
        assert_eq!(mesh.corner_normals.as_ref().map(Vec::len), Some(12));
        assert_eq!(mesh.source_frame, Some(7));
        assert_eq!(mesh.bounds().size().max_element(), 2.0);
    }
}
