//! Face and smooth corner normals.

use glam::Vec3;

use super::faces::Face;

/// Unit normal of a polygon (Newell's method), zero for degenerate faces.
pub fn face_normal(positions: &[Vec3], face: &[u32]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, &a) in face.iter().enumerate() {
        let b = face[(i + 1) % face.len()];
        let (Some(&p), Some(&q)) = (positions.get(a as usize), positions.get(b as usize)) else {
            return Vec3::ZERO;
        };
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n.normalize_or_zero()
}

/// Normals for every face corner, in face order.
///
/// A corner averages the normals of all faces sharing its vertex whose
/// normal lies within `angle_deg` of its own face. 180 degrees gives fully
/// smooth shading.
pub fn corner_normals(positions: &[Vec3], faces: &[Face], angle_deg: f32) -> Vec<Vec3> {
    let face_normals: Vec<Vec3> = faces.iter().map(|f| face_normal(positions, f)).collect();

    // vertex -> adjacent faces
    let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); positions.len()];
    for (fi, face) in faces.iter().enumerate() {
        for &v in face {
            if let Some(list) = adjacency.get_mut(v as usize) {
                list.push(fi as u32);
            }
        }
    }

    let cos_threshold = angle_deg.clamp(0.0, 180.0).to_radians().cos();
    let mut normals = Vec::with_capacity(faces.iter().map(|f| f.len()).sum());

    for (fi, face) in faces.iter().enumerate() {
        let own = face_normals[fi];
        for &v in face {
            let mut sum = Vec3::ZERO;
            let mut count = 0;
            for &other in adjacency.get(v as usize).map(Vec::as_slice).unwrap_or(&[]) {
                let other_n = face_normals[other as usize];
                if own.dot(other_n) >= cos_threshold - 1e-6 {
                    sum += other_n;
                    count += 1;
                }
            }
            normals.push(if count > 0 {
                (sum / count as f32).normalize_or_zero()
            } else {
                own
            });
        }
    }

    normals
}
