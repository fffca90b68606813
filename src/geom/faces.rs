//! Cell to face decomposition.
//!
//! Triangles and quads pass through unchanged, tetrahedra expand to their
//! four boundary triangles, everything else is dropped.

use smallvec::SmallVec;

use super::cell::{Cell, CellType};

/// Ordered point ids of one polygonal face.
pub type Face = SmallVec<[u32; 4]>;

/// Faces produced by a single cell.
pub fn cell_faces(cell: &Cell) -> SmallVec<[Face; 4]> {
    let mut out = SmallVec::new();
    match cell.cell_type {
        CellType::Triangle | CellType::Quad => {
            out.push(Face::from_slice(&cell.points));
        }
        CellType::Tetrahedron => {
            // Face j excludes point j; remaining ids keep their order.
            for j in 0..cell.points.len() {
                let face: Face = cell
                    .points
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != j)
                    .map(|(_, &id)| id)
                    .collect();
                out.push(face);
            }
        }
        CellType::Unsupported(_) => {}
    }
    out
}

/// Flat face list for all cells, in cell order.
pub fn extract_faces(cells: &[Cell]) -> Vec<Face> {
    let mut faces = Vec::with_capacity(cells.len());
    for cell in cells {
        faces.extend(cell_faces(cell));
    }
    faces
}
