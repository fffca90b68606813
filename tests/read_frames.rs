//! Integration tests for reading single legacy VTK frames from disk.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use tempfile::NamedTempFile;

use vtkseq::color::map_attributes;
use vtkseq::geom::{extract_faces, CellType, FrameMeshBuilder};
use vtkseq::vtk::{read_frame, DatasetKind, Encoding, VtkFile};
use vtkseq::ErrorKind;

const TETRA_POINTS: [f32; 12] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
const TETRA_PRESSURE: [f32; 4] = [101.5, 99.0, 100.25, 102.0];

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(bytes).expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

fn tetra_ascii() -> String {
    "# vtk DataFile Version 3.0
single tetra
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 4 float
0 0 0
1 0 0
0 1 0
0 0 1
CELLS 1 5
4 0 1 2 3
CELL_TYPES 1
10
POINT_DATA 4
SCALARS pressure float 1
LOOKUP_TABLE default
101.5 99 100.25 102
VECTORS velocity float
1 0 0 0 1 0 0 0 1 1 1 1
"
    .to_string()
}

fn tetra_binary() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"# vtk DataFile Version 3.0\nsingle tetra\nBINARY\nDATASET UNSTRUCTURED_GRID\n");
    out.extend_from_slice(b"POINTS 4 float\n");
    for v in TETRA_POINTS {
        out.write_f32::<BigEndian>(v).unwrap();
    }
    out.extend_from_slice(b"\nCELLS 1 5\n");
    for v in [4, 0, 1, 2, 3] {
        out.write_i32::<BigEndian>(v).unwrap();
    }
    out.extend_from_slice(b"\nCELL_TYPES 1\n");
    out.write_i32::<BigEndian>(10).unwrap();
    out.extend_from_slice(b"\nPOINT_DATA 4\nSCALARS pressure float 1\nLOOKUP_TABLE default\n");
    for v in TETRA_PRESSURE {
        out.write_f32::<BigEndian>(v).unwrap();
    }
    out.extend_from_slice(b"\nVECTORS velocity double\n");
    for v in [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0] {
        out.write_f64::<BigEndian>(v).unwrap();
    }
    out.push(b'\n');
    out
}

#[test]
fn test_tetra_round_trip() {
    let file = write_temp(tetra_ascii().as_bytes());
    let frame = read_frame(file.path()).expect("Failed to read tetra");

    assert_eq!(frame.header.encoding, Encoding::Ascii);
    assert_eq!(frame.header.dataset, DatasetKind::UnstructuredGrid);
    assert_eq!(frame.header.title, "single tetra");
    assert_eq!(frame.geometry.num_points(), 4);
    assert_eq!(frame.geometry.cells[0].cell_type, CellType::Tetrahedron);

    let faces = extract_faces(&frame.geometry.cells);
    let faces: Vec<Vec<u32>> = faces.iter().map(|f| f.to_vec()).collect();
    assert_eq!(faces, vec![vec![1, 2, 3], vec![0, 2, 3], vec![0, 1, 3], vec![0, 1, 2]]);

    let built = FrameMeshBuilder::new(1)
        .build(frame.geometry, frame.attributes)
        .expect("Failed to build mesh");
    assert!(built.rejected.is_empty());
    assert_eq!(built.mesh.num_faces(), 4);

    // The vector attribute is kept but never color mapped.
    assert_eq!(built.mesh.attributes.len(), 2);
    let mappings = map_attributes(&built.mesh);
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].attribute, "pressure");
    assert_eq!((mappings[0].min, mappings[0].max), (99.0, 102.0));
}

#[test]
fn test_binary_matches_ascii() {
    let ascii = write_temp(tetra_ascii().as_bytes());
    let binary = write_temp(&tetra_binary());

    let a = read_frame(ascii.path()).expect("Failed to read ASCII frame");
    let b = read_frame(binary.path()).expect("Failed to read BINARY frame");

    assert_eq!(b.header.encoding, Encoding::Binary);
    assert_eq!(a.geometry.points, b.geometry.points);
    assert_eq!(a.geometry.cells, b.geometry.cells);
    assert_eq!(a.attributes, b.attributes);
}

#[test]
fn test_vtk_file_bytes() {
    let file = write_temp(tetra_ascii().as_bytes());
    let vtk = VtkFile::open(file.path()).expect("Failed to open");
    assert_eq!(vtk.path(), file.path());
    assert_eq!(vtk.bytes(), tetra_ascii().as_bytes());
    assert_eq!(vtk.parse().unwrap().geometry.num_cells(), 1);
}

#[test]
fn test_missing_file_is_file_access() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_frame(dir.path().join("tempfile1.vtk")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileAccess);
}

#[test]
fn test_truncated_binary_is_format() {
    let mut bytes = tetra_binary();
    let cut = bytes.len() - 40;
    bytes.truncate(cut);
    let file = write_temp(&bytes);
    let err = read_frame(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_polydata_with_mixed_polygons() {
    let text = "# vtk DataFile Version 2.0
surface
ASCII
DATASET POLYDATA
POINTS 5 double
0 0 0 1 0 0 1 1 0 0 1 0 0.5 0.5 1
POLYGONS 3 15
4 0 1 2 3
3 0 1 4
5 0 1 2 3 4
";
    let file = write_temp(text.as_bytes());
    let frame = read_frame(file.path()).expect("Failed to read polydata");
    let types: Vec<_> = frame.geometry.cells.iter().map(|c| c.cell_type).collect();
    assert_eq!(types[0], CellType::Quad);
    assert_eq!(types[1], CellType::Triangle);
    assert!(!types[2].is_supported());
    assert_eq!(extract_faces(&frame.geometry.cells).len(), 2);
}
