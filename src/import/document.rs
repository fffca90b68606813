//! The finished animation handed to a host scene.

use crate::anim::{TimelineBounds, Visibility, VisibilitySchedule, VisibilityTrack};
use crate::color::{ColorMapping, ShadingChainDescriptor};
use crate::geom::FrameMesh;
use crate::util::Result;

use super::host::{MeshData, SceneHost};

/// One imported frame with everything derived from it.
#[derive(Clone, Debug)]
pub struct FrameEntry {
    pub mesh: FrameMesh,
    /// One per scalar attribute, same order as the mesh attributes.
    pub color_mappings: Vec<ColorMapping>,
    /// One per color mapping.
    pub materials: Vec<ShadingChainDescriptor>,
    pub schedule: VisibilitySchedule,
}

impl FrameEntry {
    pub fn frame(&self) -> u32 {
        self.mesh.frame
    }

    /// Mapping for an attribute name.
    pub fn color_mapping(&self, attribute: &str) -> Option<&ColorMapping> {
        self.color_mappings.iter().find(|m| m.attribute == attribute)
    }
}

/// All frames of one import run, in frame order.
#[derive(Clone, Debug)]
pub struct AnimationDocument {
    pub timeline: TimelineBounds,
    pub frames: Vec<FrameEntry>,
}

impl AnimationDocument {
    pub fn new(timeline: TimelineBounds) -> Self {
        Self {
            timeline,
            frames: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Entry for timeline frame `n`.
    pub fn frame(&self, n: u32) -> Option<&FrameEntry> {
        self.frames.iter().find(|e| e.frame() == n)
    }

    /// Frame numbers present, ascending.
    pub fn frame_numbers(&self) -> Vec<u32> {
        self.frames.iter().map(FrameEntry::frame).collect()
    }

    /// Entries visible at a timeline position.
    pub fn visible_at(&self, position: f64) -> impl Iterator<Item = &FrameEntry> {
        self.frames
            .iter()
            .filter(move |e| e.schedule.visibility_at(position) == Visibility::Visible)
    }

    /// Push the document into a host scene, replacing whatever it held.
    #[tracing::instrument(skip_all, fields(frames = self.frames.len()))]
    pub fn realize<H: SceneHost>(&self, host: &mut H) -> Result<()> {
        host.begin_scene(self.timeline)?;
        for entry in &self.frames {
            let mesh = &entry.mesh;
            let name = mesh.name();
            let (face_counts, face_indices) = mesh.face_buffers();
            let handle = host.create_mesh(&MeshData {
                name: &name,
                positions: mesh.positions_flat(),
                face_counts: &face_counts,
                face_indices: &face_indices,
                corner_normals: mesh.corner_normals.as_deref(),
            })?;

            for attr in mesh.scalar_attributes() {
                host.add_point_attribute(&handle, &attr.name, &attr.values)?;
            }
            for material in &entry.materials {
                host.create_material(&handle, material)?;
            }
            for key in &entry.schedule.keyframes {
                for track in VisibilityTrack::ALL {
                    host.insert_visibility_keyframe(&handle, track, key)?;
                }
            }
        }
        Ok(())
    }
}
