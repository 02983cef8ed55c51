use std::io::Write;

use float_eq::assert_float_eq;
use objview_mesh::{compute_bounds, TARGET_EXTENT};
use objview_test_data::{OBJ_CORNER, OBJ_CUBE};

#[test]
fn parse_cube() {
    let mesh = objview_obj::parse_obj(OBJ_CUBE.bytes).unwrap();
    assert_eq!(OBJ_CUBE.vertex_count, mesh.vertex_count());
    assert_eq!(OBJ_CUBE.normal_count, mesh.normal_count());
    assert_eq!(OBJ_CUBE.face_count, mesh.face_count());

    // Every face of the fixture carries normals, and all indices resolve.
    for face in mesh.faces() {
        let normals = face.normals.expect("cube faces carry normals");
        for i in face.vertices {
            assert!((i as usize) < mesh.vertex_count());
        }
        for i in normals {
            assert!((i as usize) < mesh.normal_count());
        }
    }
}

#[test]
fn cube_scale_fits_viewing_volume() {
    let mesh = objview_obj::parse_obj(OBJ_CUBE.bytes).unwrap();
    let bounds = compute_bounds(&mesh);
    assert_float_eq!(OBJ_CUBE.extent, bounds.range(), abs <= 1e-5);
    assert_float_eq!(
        TARGET_EXTENT / OBJ_CUBE.extent,
        bounds.scale_factor,
        abs <= 1e-5
    );
}

#[test]
fn corner_model_end_to_end() {
    let mesh = objview_obj::parse_obj(OBJ_CORNER.bytes).unwrap();
    assert_eq!(OBJ_CORNER.vertex_count, mesh.vertex_count());
    assert_eq!(OBJ_CORNER.face_count, mesh.face_count());
    assert!(mesh.faces().iter().all(|f| f.normals.is_none()));

    let bounds = compute_bounds(&mesh);
    assert_float_eq!(
        TARGET_EXTENT,
        bounds.scale_factor * bounds.range(),
        abs <= 1e-4
    );
}

#[test]
fn read_obj_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corner.obj");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(OBJ_CORNER.bytes)
        .unwrap();

    let mesh = objview_obj::read_obj(&path).unwrap();
    assert_eq!(OBJ_CORNER.vertex_count, mesh.vertex_count());
    assert_eq!(OBJ_CORNER.face_count, mesh.face_count());
}

#[test]
fn read_obj_missing_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = objview_obj::read_obj(dir.path().join("nope.obj")).unwrap_err();
    assert_eq!(std::io::ErrorKind::NotFound, err.kind());
}
