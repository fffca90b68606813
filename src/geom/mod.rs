//! Geometry for imported frames.
//!
//! - [`cell`] - Raw cells, cell types and point attributes
//! - [`faces`] - Cell to face decomposition
//! - [`mesh`] - [`FrameMesh`] and its builder
//! - [`normals`] - Face and smooth corner normals

pub mod cell;
pub mod faces;
pub mod mesh;
pub mod normals;

pub use cell::{Arity, Cell, CellPoints, CellType, PointAttribute, RawGeometry};
pub use faces::{cell_faces, extract_faces, Face};
pub use mesh::{BuiltMesh, FrameMesh, FrameMeshBuilder, MeshTransform};
pub use normals::{corner_normals, face_normal};
