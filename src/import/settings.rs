//! Batch import settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::resolver::FramePattern;
use crate::geom::MeshTransform;
use crate::util::{Axis, Result};

/// User-facing controls for one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    // Source
    pub directory: Option<PathBuf>,
    pub start_frame: u32,
    /// Last frame, inclusive. `None` scans the directory instead.
    pub end_frame: Option<u32>,
    pub file_stem: String,
    pub extension: String,

    // Geometry
    pub scale_factor: f32,
    pub axis_forward: Axis,
    pub axis_up: Axis,

    // Shading
    pub smooth_shading: bool,
    pub smooth_angle: f32, // 0-180 degrees

    // Execution
    pub parallel: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            directory: None,
            start_frame: 1,
            end_frame: None,
            file_stem: "tempfile".to_string(),
            extension: "vtk".to_string(),
            scale_factor: 1.0,
            axis_forward: Axis::Y,
            axis_up: Axis::Z,
            smooth_shading: true,
            smooth_angle: 180.0,
            parallel: true,
        }
    }
}

impl ImportSettings {
    /// Default settings file, `<config_dir>/vtkseq/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("vtkseq");
            p.push("settings.json");
            p
        })
    }

    /// Read settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::from_file(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            Self::default()
        })
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Vertex transform from scale and axis controls.
    pub fn transform(&self) -> Result<MeshTransform> {
        MeshTransform::new(self.scale_factor, self.axis_forward, self.axis_up)
    }

    /// File naming pattern for directory sources.
    pub fn pattern(&self) -> FramePattern {
        FramePattern::new(&self.file_stem, &self.extension)
    }

    /// Smoothing threshold when smooth shading is on.
    pub fn smooth_angle(&self) -> Option<f32> {
        self.smooth_shading.then_some(self.smooth_angle.clamp(0.0, 180.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ImportSettings::default();
        assert_eq!(s.start_frame, 1);
        assert_eq!(s.pattern().file_name(3), "tempfile3.vtk");
        assert!(s.transform().unwrap().is_identity());
        assert_eq!(s.smooth_angle(), Some(180.0));
    }

    #[test]
    fn test_partial_json() {
        let s: ImportSettings =
            serde_json::from_str(r#"{ "scale_factor": 0.01, "axis_forward": "-Z", "axis_up": "Y", "smooth_shading": false }"#)
                .unwrap();
        assert_eq!(s.scale_factor, 0.01);
        assert_eq!(s.axis_forward, Axis::NegZ);
        assert_eq!(s.file_stem, "tempfile");
        assert_eq!(s.smooth_angle(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let s = ImportSettings {
            start_frame: 5,
            end_frame: Some(9),
            ..Default::default()
        };
        s.save(&path).unwrap();
        assert_eq!(ImportSettings::from_file(&path).unwrap(), s);
    }

    #[test]
    fn test_invalid_axes() {
        let s = ImportSettings {
            axis_forward: Axis::Z,
            axis_up: Axis::Z,
            ..Default::default()
        };
        assert!(s.transform().is_err());
    }
}
