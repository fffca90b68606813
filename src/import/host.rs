//! Host scene boundary.
//!
//! [`SceneHost`] lists the primitives a host application must provide to
//! receive an [`AnimationDocument`](super::AnimationDocument).
//! [`JsonScene`] implements it by recording a serializable scene.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec3;
use serde::Serialize;

use crate::anim::{Interpolation, Keyframe, TimelineBounds, VisibilityTrack};
use crate::color::ShadingChainDescriptor;
use crate::util::Result;

/// Borrowed mesh buffers for host upload.
#[derive(Clone, Copy, Debug)]
pub struct MeshData<'a> {
    pub name: &'a str,
    /// Flat xyz positions.
    pub positions: &'a [f32],
    pub face_counts: &'a [u32],
    pub face_indices: &'a [u32],
    /// Smooth normals per face corner, when smoothing is enabled.
    pub corner_normals: Option<&'a [Vec3]>,
}

/// Scene primitives the importer needs from a host.
pub trait SceneHost {
    /// Host-side reference to a created mesh object.
    type Mesh;

    /// Replace any previous scene and set the timeline range.
    fn begin_scene(&mut self, timeline: TimelineBounds) -> Result<()>;

    /// Create a mesh object.
    fn create_mesh(&mut self, mesh: &MeshData<'_>) -> Result<Self::Mesh>;

    /// Attach a per-point float field.
    fn add_point_attribute(&mut self, mesh: &Self::Mesh, name: &str, values: &[f32]) -> Result<()>;

    /// Create and assign a material built from the shading chain.
    fn create_material(&mut self, mesh: &Self::Mesh, material: &ShadingChainDescriptor) -> Result<()>;

    /// Insert one visibility key on one track.
    fn insert_visibility_keyframe(
        &mut self,
        mesh: &Self::Mesh,
        track: VisibilityTrack,
        key: &Keyframe,
    ) -> Result<()>;
}

/// Key as written to a host "hide" channel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JsonKey {
    pub frame: u32,
    /// `true` = hidden.
    pub value: bool,
    pub interpolation: Interpolation,
}

/// One mesh object of a [`JsonScene`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct JsonObject {
    pub name: String,
    pub positions: Vec<f32>,
    pub face_counts: Vec<u32>,
    pub face_indices: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_normals: Option<Vec<[f32; 3]>>,
    pub attributes: BTreeMap<String, Vec<f32>>,
    pub materials: Vec<ShadingChainDescriptor>,
    /// Channel data path -> keys.
    pub animation: BTreeMap<&'static str, Vec<JsonKey>>,
}

/// Scene recorded as plain data, serializable to JSON.
#[derive(Clone, Debug, Default, Serialize)]
pub struct JsonScene {
    pub frame_start: u32,
    pub frame_end: u32,
    pub objects: Vec<JsonObject>,
}

impl JsonScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object by name.
    pub fn object(&self, name: &str) -> Option<&JsonObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty JSON to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        Ok(())
    }
}

impl SceneHost for JsonScene {
    type Mesh = usize;

    fn begin_scene(&mut self, timeline: TimelineBounds) -> Result<()> {
        self.objects.clear();
        self.frame_start = timeline.start;
        self.frame_end = timeline.end;
        Ok(())
    }

    fn create_mesh(&mut self, mesh: &MeshData<'_>) -> Result<usize> {
        self.objects.push(JsonObject {
            name: mesh.name.to_string(),
            positions: mesh.positions.to_vec(),
            face_counts: mesh.face_counts.to_vec(),
            face_indices: mesh.face_indices.to_vec(),
            corner_normals: mesh
                .corner_normals
                .map(|n| n.iter().map(|v| v.to_array()).collect()),
            ..Default::default()
        });
        Ok(self.objects.len() - 1)
    }

    fn add_point_attribute(&mut self, mesh: &usize, name: &str, values: &[f32]) -> Result<()> {
        self.objects[*mesh]
            .attributes
            .insert(name.to_string(), values.to_vec());
        Ok(())
    }

    fn create_material(&mut self, mesh: &usize, material: &ShadingChainDescriptor) -> Result<()> {
        self.objects[*mesh].materials.push(material.clone());
        Ok(())
    }

    fn insert_visibility_keyframe(
        &mut self,
        mesh: &usize,
        track: VisibilityTrack,
        key: &Keyframe,
    ) -> Result<()> {
        self.objects[*mesh]
            .animation
            .entry(track.data_path())
            .or_default()
            .push(JsonKey {
                frame: key.position,
                value: key.visibility.hide_flag(),
                interpolation: key.interpolation,
            });
        Ok(())
    }
}
