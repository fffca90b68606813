//! Legacy VTK (`.vtk`) file reading.
//!
//! Supports the `UNSTRUCTURED_GRID` and `POLYDATA` datasets in ASCII or
//! big-endian BINARY encoding. Geometry comes back as [`RawGeometry`]
//! and point-attached arrays as [`PointAttribute`]s.
//!
//! [`RawGeometry`]: crate::geom::RawGeometry
//! [`PointAttribute`]: crate::geom::PointAttribute

mod cursor;
pub mod format;
mod reader;

pub use format::{DatasetKind, Encoding, ScalarType, VtkHeader};
pub use reader::{parse_frame, read_frame, RawFrame, VtkFile};
