pub type Vector3 = cgmath::Vector3<f32>;

// We rely on Vector3 being repr(c).
static_assertions::assert_eq_size!(Vector3, [f32; 3]);
static_assertions::assert_eq_align!(Vector3, f32);

/// A triangle that references its geometry by index.
///
/// Indices are zero-based positions into the vertex and normal lists of the
/// owning [`crate::MeshStore`] (OBJ files count from one; the parser
/// subtracts one on ingest). Faces are deliberately not validated on
/// construction: a file may name an index beyond the loaded vertex set, and
/// we would rather render the triangles we can resolve than reject the whole
/// model. Every consumer must bounds-check an index before dereferencing it.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Face {
    /// Indices of the three corner vertices.
    pub vertices: [u32; 3],

    /// Indices of the per-corner normals, when the face record carried them.
    pub normals: Option<[u32; 3]>,
}

impl Face {
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }
}
