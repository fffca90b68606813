//! Frame file resolution.
//!
//! Turns a directory + frame range, a scanned directory, or an explicit
//! file list into ordered `(frame, path)` pairs. Frames are numbered from 1
//! in order; whether a file exists is checked later, per frame.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::util::{Error, Result};

/// `<stem><n>.<ext>` naming used by the frame exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramePattern {
    pub stem: String,
    pub extension: String,
}

impl FramePattern {
    pub fn new(stem: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// File name for source frame `n`.
    pub fn file_name(&self, n: u32) -> String {
        format!("{}{}.{}", self.stem, n, self.extension)
    }

    /// Source frame number if `file_name` follows the pattern.
    pub fn match_number(&self, file_name: &str) -> Option<u32> {
        let rest = file_name.strip_prefix(&self.stem)?;
        let digits = rest.strip_suffix(&self.extension)?.strip_suffix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl Default for FramePattern {
    fn default() -> Self {
        Self::new("tempfile", "vtk")
    }
}

/// One frame to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFile {
    /// Timeline position, 1-based.
    pub frame: u32,
    /// Number from the file name, when there is one.
    pub source_frame: Option<u32>,
    pub path: PathBuf,
}

/// Where the frames of a run come from.
#[derive(Clone, Debug)]
pub enum FrameSource {
    /// `dir/<stem><n>.<ext>` for `n` in `start..=end`.
    Range {
        dir: PathBuf,
        start: u32,
        end: u32,
        pattern: FramePattern,
    },
    /// Every pattern match in `dir`, in numeric order.
    Discover { dir: PathBuf, pattern: FramePattern },
    /// Explicit ordered list.
    Files(Vec<PathBuf>),
}

impl FrameSource {
    /// Ordered frame files. Fails only for an empty or inverted batch.
    pub fn resolve(&self) -> Result<Vec<FrameFile>> {
        let files = match self {
            Self::Range {
                dir,
                start,
                end,
                pattern,
            } => {
                if start > end {
                    return Err(Error::InvalidFrameRange {
                        start: *start,
                        end: *end,
                    });
                }
                (*start..=*end)
                    .zip(1u32..)
                    .map(|(n, frame)| FrameFile {
                        frame,
                        source_frame: Some(n),
                        path: dir.join(pattern.file_name(n)),
                    })
                    .collect()
            }
            Self::Discover { dir, pattern } => discover(dir, pattern)?,
            Self::Files(paths) => paths
                .iter()
                .zip(1u32..)
                .map(|(path, frame)| FrameFile {
                    frame,
                    source_frame: trailing_number(path),
                    path: path.clone(),
                })
                .collect(),
        };

        if files.is_empty() {
            return Err(Error::NoInputFiles);
        }
        debug!(frames = files.len(), "resolved frame files");
        Ok(files)
    }
}

fn discover(dir: &Path, pattern: &FramePattern) -> Result<Vec<FrameFile>> {
    let mut found: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| Error::file_access(dir, e))? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(n) = name.to_str().and_then(|s| pattern.match_number(s)) {
            found.push((n, entry.path()));
        }
    }
    found.sort_by_key(|(n, _)| *n);
    Ok(found
        .into_iter()
        .zip(1u32..)
        .map(|((n, path), frame)| FrameFile {
            frame,
            source_frame: Some(n),
            path,
        })
        .collect())
}

/// Digits at the end of a file stem, e.g. `7` for `tempfile7.vtk`.
fn trailing_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let start = stem.len() - stem.bytes().rev().take_while(u8::is_ascii_digit).count();
    stem.get(start..).filter(|d| !d.is_empty())?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern() {
        let p = FramePattern::new("tempfile", ".vtk");
        assert_eq!(p.file_name(12), "tempfile12.vtk");
        assert_eq!(p.match_number("tempfile12.vtk"), Some(12));
        assert_eq!(p.match_number("tempfile.vtk"), None);
        assert_eq!(p.match_number("tempfile1a.vtk"), None);
        assert_eq!(p.match_number("other3.vtk"), None);
        assert_eq!(p.match_number("tempfile3.x3d"), None);
    }

    #[test]
    fn test_range() {
        let src = FrameSource::Range {
            dir: PathBuf::from("out"),
            start: 4,
            end: 6,
            pattern: FramePattern::default(),
        };
        let files = src.resolve().unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].frame, 1);
        assert_eq!(files[0].source_frame, Some(4));
        assert_eq!(files[2].path, Path::new("out").join("tempfile6.vtk"));
    }

    #[test]
    fn test_invalid_range() {
        let src = FrameSource::Range {
            dir: PathBuf::from("."),
            start: 5,
            end: 2,
            pattern: FramePattern::default(),
        };
        assert!(matches!(src.resolve(), Err(Error::InvalidFrameRange { start: 5, end: 2 })));
    }

    #[test]
    fn test_files() {
        let src = FrameSource::Files(vec!["b/step10.vtk".into(), "a/mesh.vtk".into()]);
        let files = src.resolve().unwrap();
        assert_eq!(files[0].frame, 1);
        assert_eq!(files[0].source_frame, Some(10));
        assert_eq!(files[1].frame, 2);
        assert_eq!(files[1].source_frame, None);

        assert!(matches!(FrameSource::Files(Vec::new()).resolve(), Err(Error::NoInputFiles)));
    }

    #[test]
    fn test_discover_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["tempfile10.vtk", "tempfile9.vtk", "tempfile1.vtk", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let src = FrameSource::Discover {
            dir: dir.path().to_path_buf(),
            pattern: FramePattern::default(),
        };
        let files = src.resolve().unwrap();
        let numbers: Vec<_> = files.iter().map(|f| f.source_frame).collect();
        assert_eq!(numbers, vec![Some(1), Some(9), Some(10)]);
        assert_eq!(files[2].frame, 3);
    }

    #[test]
    fn test_discover_empty() {
        let dir = tempfile::tempdir().unwrap();
        let src = FrameSource::Discover {
            dir: dir.path().to_path_buf(),
            pattern: FramePattern::default(),
        };
        assert!(matches!(src.resolve(), Err(Error::NoInputFiles)));
    }
}
