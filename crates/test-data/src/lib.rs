pub struct TestModel {
    pub bytes: &'static [u8],
    pub vertex_count: usize,
    pub normal_count: usize,
    pub face_count: usize,
    /// Largest axis extent of the model, in file units.
    pub extent: f32,
}

/// A 20-unit cube with per-face normals, faces in `v//n` form.
pub const OBJ_CUBE: TestModel = TestModel {
    bytes: include_bytes!("../../../res/cube/cube.obj"),
    vertex_count: 8,
    normal_count: 6,
    face_count: 12,
    extent: 20.0,
};

/// Four vertices on a unit cube corner and two plain-index triangles.
pub const OBJ_CORNER: TestModel = TestModel {
    bytes: include_bytes!("../../../res/corner/corner.obj"),
    vertex_count: 4,
    normal_count: 0,
    face_count: 2,
    extent: 1.0,
};
