//! # vtkseq
//!
//! Imports a numbered sequence of legacy VTK files as a frame-by-frame
//! mesh animation.
//!
//! Every file becomes one mesh object. Point scalars are kept as float
//! fields and get a color-mapped material, and visibility keys show each
//! mesh only on its own frame.
//!
//! ## Modules
//!
//! - [`util`] - Errors, axes and bounding boxes
//! - [`vtk`] - Legacy VTK reader (ASCII and BINARY)
//! - [`geom`] - Cells, face extraction, frame meshes and normals
//! - [`color`] - Attribute ranges and shading chains
//! - [`anim`] - Visibility keyframes and schedules
//! - [`import`] - Frame resolution, batch pipeline and host scenes
//!
//! ## Example
//!
//! ```ignore
//! use vtkseq::prelude::*;
//!
//! let source = FrameSource::Range {
//!     dir: "output".into(),
//!     start: 1,
//!     end: 100,
//!     pattern: FramePattern::default(),
//! };
//! let report = import_frames(&source, ImportSettings::default())?;
//!
//! let mut scene = JsonScene::new();
//! report.document.realize(&mut scene)?;
//! scene.write("scene.json")?;
//! ```

pub mod util;
pub mod vtk;
pub mod geom;
pub mod color;
pub mod anim;
pub mod import;

// Re-export commonly used types
pub use util::{Error, ErrorKind, Result};
pub use import::{import_frames, AnimationDocument, ImportReport, ImportSettings};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Axis, Error, ErrorKind, Result};
    pub use crate::vtk::{read_frame, RawFrame};
    pub use crate::geom::{FrameMesh, FrameMeshBuilder, MeshTransform, PointAttribute};
    pub use crate::color::{ColorMapping, ShadingChainDescriptor};
    pub use crate::anim::{Visibility, VisibilitySchedule, VisibilityTrack};
    pub use crate::import::*;
}
