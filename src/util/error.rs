//! Error types for the importer.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse error category, used by the batch report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// File missing or unreadable. Fatal to one frame.
    FileAccess,
    /// Malformed or truncated file content. Fatal to one frame.
    Format,
    /// Frame parsed but has nothing to render. Fatal to one frame.
    EmptyGeometry,
    /// Attribute with the wrong tuple count. Fatal to that attribute only.
    AttributeLengthMismatch,
    /// Problem with the batch itself. Aborts the run.
    Batch,
    /// Invalid settings or failed output.
    Config,
}

/// Main error type for import operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be read
    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed header, block or value
    #[error("Malformed VTK data at byte {offset}: {message}")]
    Format { offset: u64, message: String },

    /// No points, or no faces left after cell decomposition
    #[error("Frame has no renderable geometry ({points} points, {faces} faces)")]
    EmptyGeometry { points: usize, faces: usize },

    /// Attribute tuple count differs from the frame's point count
    #[error("Attribute '{name}' has {actual} tuples, expected {expected}")]
    AttributeLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Nothing to import
    #[error("No input files")]
    NoInputFiles,

    /// Start frame after end frame
    #[error("Invalid frame range {start}..={end}")]
    InvalidFrameRange { start: u32, end: u32 },

    /// Keyframe request outside the timeline
    #[error("Frame {frame} is outside the timeline 1..={total}")]
    InvalidSchedule { frame: u32, total: u32 },

    /// Forward and up axes are not perpendicular
    #[error("Invalid axis pair: forward {forward}, up {up}")]
    InvalidAxes { forward: String, up: String },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a format error at the given byte offset.
    pub fn format(offset: usize, msg: impl Into<String>) -> Self {
        Self::Format {
            offset: offset as u64,
            message: msg.into(),
        }
    }

    /// Wrap an I/O error from opening or reading `path`.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileAccess { .. } => ErrorKind::FileAccess,
            Self::Format { .. } => ErrorKind::Format,
            Self::EmptyGeometry { .. } => ErrorKind::EmptyGeometry,
            Self::AttributeLengthMismatch { .. } => ErrorKind::AttributeLengthMismatch,
            Self::NoInputFiles | Self::InvalidFrameRange { .. } => ErrorKind::Batch,
            Self::InvalidSchedule { .. }
            | Self::InvalidAxes { .. }
            | Self::Json(_)
            | Self::Io(_) => ErrorKind::Config,
        }
    }

    /// True if this error aborts a whole batch rather than one frame.
    pub fn is_batch_fatal(&self) -> bool {
        self.kind() == ErrorKind::Batch
    }
}

/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;
