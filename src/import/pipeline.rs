//! Batch import: resolve, read, build and schedule every frame.
//!
//! Frames are independent until scheduling, so they are processed in
//! parallel with rayon. A frame that fails to read or build is logged and
//! left out; the rest of the batch continues. Scheduling waits for every
//! frame and uses the resolved frame count as the timeline length.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{error, info, warn};

use super::document::{AnimationDocument, FrameEntry};
use super::resolver::{FrameFile, FrameSource};
use super::settings::ImportSettings;
use crate::anim::{schedule_all, TimelineBounds, VisibilitySchedule};
use crate::color::{map_attributes, ShadingChainDescriptor};
use crate::geom::{FrameMesh, FrameMeshBuilder, MeshTransform};
use crate::util::{Error, Result};
use crate::vtk::read_frame;

/// A frame left out of the document.
#[derive(Debug)]
pub struct FrameFailure {
    pub frame: u32,
    pub path: PathBuf,
    pub error: Error,
}

/// A non-fatal problem inside an imported frame.
#[derive(Debug)]
pub struct FrameWarning {
    pub frame: u32,
    pub error: Error,
}

/// Outcome of one import run.
#[derive(Debug)]
pub struct ImportReport {
    pub document: AnimationDocument,
    pub failures: Vec<FrameFailure>,
    pub warnings: Vec<FrameWarning>,
}

impl ImportReport {
    /// Frames requested, successful or not.
    pub fn requested(&self) -> u32 {
        self.document.timeline.len()
    }

    pub fn imported(&self) -> usize {
        self.document.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Timeline positions that failed.
    pub fn failed_frames(&self) -> Vec<u32> {
        self.failures.iter().map(|f| f.frame).collect()
    }
}

/// Per-frame result before scheduling.
struct Processed {
    mesh: FrameMesh,
    rejected: Vec<Error>,
}

/// Runs batch imports with fixed settings.
#[derive(Clone, Debug)]
pub struct Importer {
    settings: ImportSettings,
    transform: MeshTransform,
}

impl Importer {
    /// Validate settings and prepare the vertex transform.
    pub fn new(settings: ImportSettings) -> Result<Self> {
        let transform = settings.transform()?;
        Ok(Self {
            settings,
            transform,
        })
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Source described by the settings: a frame range when an end frame is
    /// set, otherwise every matching file in the directory.
    pub fn settings_source(&self) -> Result<FrameSource> {
        let dir = self.settings.directory.clone().ok_or(Error::NoInputFiles)?;
        let pattern = self.settings.pattern();
        Ok(match self.settings.end_frame {
            Some(end) => FrameSource::Range {
                dir,
                start: self.settings.start_frame,
                end,
                pattern,
            },
            None => FrameSource::Discover { dir, pattern },
        })
    }

    /// Resolve `source` and import every frame.
    pub fn import(&self, source: &FrameSource) -> Result<ImportReport> {
        self.import_files(source.resolve()?)
    }

    /// Import an already resolved frame list.
    #[tracing::instrument(skip_all, fields(frames = files.len()))]
    pub fn import_files(&self, files: Vec<FrameFile>) -> Result<ImportReport> {
        if files.is_empty() {
            return Err(Error::NoInputFiles);
        }
        let total = files.len() as u32;

        let results: Vec<(FrameFile, Result<Processed>)> = if self.settings.parallel {
            files
                .into_par_iter()
                .map(|file| {
                    let result = self.process_frame(&file);
                    (file, result)
                })
                .collect()
        } else {
            files
                .into_iter()
                .map(|file| {
                    let result = self.process_frame(&file);
                    (file, result)
                })
                .collect()
        };

        let mut meshes = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        let mut warnings = Vec::new();
        for (file, result) in results {
            match result {
                Ok(processed) => {
                    warnings.extend(processed.rejected.into_iter().map(|error| FrameWarning {
                        frame: file.frame,
                        error,
                    }));
                    meshes.push(processed.mesh);
                }
                Err(e) => {
                    error!(frame = file.frame, path = %file.path.display(), "skipping frame: {e}");
                    failures.push(FrameFailure {
                        frame: file.frame,
                        path: file.path,
                        error: e,
                    });
                }
            }
        }

        // Barrier: every frame is settled before any schedule exists.
        let numbers: Vec<u32> = meshes.iter().map(|m| m.frame).collect();
        let schedules = schedule_all(&numbers, total)?;
        let document = assemble(TimelineBounds::for_frames(total), meshes, schedules);

        if failures.is_empty() {
            info!(imported = document.len(), "import complete");
        } else {
            warn!(
                imported = document.len(),
                failed = failures.len(),
                requested = total,
                "import finished with failures"
            );
        }

        Ok(ImportReport {
            document,
            failures,
            warnings,
        })
    }

    /// Read and build a single frame.
    fn process_frame(&self, file: &FrameFile) -> Result<Processed> {
        let raw = read_frame(&file.path)?;
        let built = FrameMeshBuilder::new(file.frame)
            .source(&file.path, file.source_frame)
            .transform(self.transform)
            .smooth_shading(self.settings.smooth_angle())
            .build(raw.geometry, raw.attributes)?;
        Ok(Processed {
            mesh: built.mesh,
            rejected: built.rejected,
        })
    }
}

fn assemble(
    timeline: TimelineBounds,
    meshes: Vec<FrameMesh>,
    schedules: Vec<VisibilitySchedule>,
) -> AnimationDocument {
    let mut document = AnimationDocument::new(timeline);
    document.frames = meshes
        .into_iter()
        .zip(schedules)
        .map(|(mesh, schedule)| {
            let color_mappings = map_attributes(&mesh);
            let name = mesh.name();
            let materials = color_mappings
                .iter()
                .map(|m| ShadingChainDescriptor::for_mapping(&name, m))
                .collect();
            FrameEntry {
                mesh,
                color_mappings,
                materials,
                schedule,
            }
        })
        .collect();
    document
}

/// One-shot import with `settings`.
pub fn import_frames(source: &FrameSource, settings: ImportSettings) -> Result<ImportReport> {
    Importer::new(settings)?.import(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::Visibility;
    use crate::import::FramePattern;
    use std::path::Path;

    const TRI: &str = "# vtk DataFile Version 3.0
tri
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 3 float
0 0 0 1 0 0 0 1 0
CELLS 1 4
3 0 1 2
CELL_TYPES 1
5
POINT_DATA 3
SCALARS temperature float 1
LOOKUP_TABLE default
1 2 3
";

    fn write_frames(dir: &Path, count: u32) {
        for n in 1..=count {
            std::fs::write(dir.join(format!("tempfile{n}.vtk")), TRI).unwrap();
        }
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 4);
        let source = FrameSource::Discover {
            dir: dir.path().to_path_buf(),
            pattern: FramePattern::default(),
        };

        let seq = import_frames(
            &source,
            ImportSettings {
                parallel: false,
                ..Default::default()
            },
        )
        .unwrap();
        let par = import_frames(&source, ImportSettings::default()).unwrap();

        assert_eq!(seq.document.frame_numbers(), vec![1, 2, 3, 4]);
        assert_eq!(par.document.frame_numbers(), seq.document.frame_numbers());
        assert!(par.is_complete());
    }

    #[test]
    fn test_entry_contents() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 3);
        let report = Importer::new(ImportSettings {
            directory: Some(dir.path().to_path_buf()),
            end_frame: Some(3),
            ..Default::default()
        })
        .and_then(|imp| imp.import(&imp.settings_source()?))
        .unwrap();

        let entry = report.document.frame(2).unwrap();
        assert_eq!(entry.mesh.name(), "Frame_2");
        assert_eq!(entry.mesh.source_frame, Some(2));
        let mapping = entry.color_mapping("temperature").unwrap();
        assert_eq!((mapping.min, mapping.max), (1.0, 3.0));
        assert_eq!(entry.materials[0].name, "Frame_2_temperature_Material");
        assert_eq!(entry.schedule.visibility_at(2.0), Visibility::Visible);
        assert_eq!(entry.schedule.visibility_at(3.0), Visibility::Hidden);
    }

    #[test]
    fn test_missing_frame_keeps_timeline() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 3);
        std::fs::remove_file(dir.path().join("tempfile2.vtk")).unwrap();
        let source = FrameSource::Range {
            dir: dir.path().to_path_buf(),
            start: 1,
            end: 3,
            pattern: FramePattern::default(),
        };
        let report = import_frames(&source, ImportSettings::default()).unwrap();

        assert_eq!(report.requested(), 3);
        assert_eq!(report.document.frame_numbers(), vec![1, 3]);
        assert_eq!(report.failed_frames(), vec![2]);
        assert_eq!(report.document.timeline, TimelineBounds { start: 1, end: 3 });
        // Nothing is visible in the gap.
        assert_eq!(report.document.visible_at(2.0).count(), 0);
    }

    #[test]
    fn test_no_directory() {
        let imp = Importer::new(ImportSettings::default()).unwrap();
        assert!(matches!(imp.settings_source(), Err(Error::NoInputFiles)));
    }
}
