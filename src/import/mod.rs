//! Batch import of a VTK frame sequence into an animation document.

mod document;
mod host;
mod pipeline;
mod resolver;
mod settings;

pub use document::{AnimationDocument, FrameEntry};
pub use host::{JsonKey, JsonObject, JsonScene, MeshData, SceneHost};
pub use pipeline::{import_frames, FrameFailure, FrameWarning, ImportReport, Importer};
pub use resolver::{FrameFile, FramePattern, FrameSource};
pub use settings::ImportSettings;
